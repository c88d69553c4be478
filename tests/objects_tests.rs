//! Declared object tests: identity, attribute access and references

use serde_json::json;
use tfdeclare::{Attr, DeclareError, Kind, ObjectKind, Registry};

#[test]
fn test_named_object() {
    let registry = Registry::new();
    let var = registry.variable("var1", json!({"default": "foo"})).unwrap();

    assert_eq!(var.name(), "var1");
    assert_eq!(var.kind(), ObjectKind::from(Kind::Variable));
    assert_eq!(var.values(), *json!({"default": "foo"}).as_object().unwrap());
}

#[test]
fn test_typed_object() {
    let registry = Registry::new();
    let ami = registry
        .data(
            "aws_ami",
            "ecs_ami",
            json!({
                "most_recent": true,
                "filter": [
                    {"name": "name", "values": ["*amazon-ecs-optimized"]},
                    {"name": "owner-alias", "values": ["amazon"]},
                ],
            }),
        )
        .unwrap();

    assert_eq!(ami.object_type().as_deref(), Some("aws_ami"));
    assert_eq!(ami.name(), "ecs_ami");
    assert_eq!(ami.values()["most_recent"], json!(true));
    assert_eq!(ami.terraform_name().as_deref(), Some("data.aws_ami.ecs_ami"));
}

#[test]
fn test_unset_attribute_is_a_reference() {
    let registry = Registry::new();
    let res = registry.resource("res1", "foo", json!({"attr": "value"})).unwrap();

    assert_eq!(res.get("id").unwrap(), "${res1.foo.id}");
    assert!(res.get("id").unwrap().as_reference().is_some());
    assert_eq!(res.get("attr").unwrap(), Attr::Literal(json!("value")));
}

#[test]
fn test_variables_do_not_interpolate() {
    let registry = Registry::new();
    let var = registry.variable("var1", json!({"default": "value"})).unwrap();

    assert_eq!(var.to_string(), "${var.var1}");
    assert_eq!(format!("prefix-{var}"), "prefix-${var.var1}");

    let err = var.get("id").unwrap_err();
    assert_eq!(
        err,
        DeclareError::Interpolation {
            kind: "Variable".to_owned(),
            attribute: "id".to_owned(),
        }
    );
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_set_attribute() {
    let registry = Registry::new();
    let res = registry.resource("res1", "foo", json!({"attr": "value"})).unwrap();

    res.set("attr", "changed");
    res.set("not_tf_attr", "value");

    assert_eq!(res.get("attr").unwrap(), "changed");
    assert_eq!(res.get("not_tf_attr").unwrap(), "value");
    assert!(!res.values().contains_key("not_tf_attr"));

    let document = registry.compile().unwrap();
    assert_eq!(
        document.to_value(),
        json!({"resource": {"res1": {"foo": {"attr": "changed"}}}})
    );
}

#[test]
fn test_access_before_and_after_freeze() {
    let registry = Registry::new();
    let sg = registry
        .resource("aws_security_group", "sg", json!({"ingress": ["foo"]}))
        .unwrap();

    assert_eq!(sg.get("id").unwrap(), "${aws_security_group.sg.id}");
    assert_eq!(sg.get("ingress").unwrap(), json!(["foo"]));

    registry.freeze();
    assert_eq!(sg.get("ingress").unwrap(), "${aws_security_group.sg.ingress}");

    registry.reset();
    assert!(!registry.is_frozen());
    assert_eq!(sg.get("ingress").unwrap(), json!(["foo"]));
}

#[test]
fn test_interpolated() {
    let registry = Registry::new();
    let foo = registry
        .resource("aws_security_group", "sg", json!({"name": "sg"}))
        .unwrap();

    assert_eq!(foo.get("name").unwrap(), "sg");
    assert_eq!(foo.interpolated("name").unwrap(), "${aws_security_group.sg.name}");
    assert_eq!(foo.get("name").unwrap(), "sg");
    assert!(!registry.is_frozen());
}

#[test]
fn test_reference_chains() {
    let registry = Registry::new();
    let secrets = registry
        .data(
            "aws_kms_secrets",
            "test",
            json!({"secret": [{"name": "foo", "payload": "bar"}]}),
        )
        .unwrap();

    let plaintext = secrets.reference("plaintext").unwrap();
    assert_eq!(plaintext.key("foo"), "${data.aws_kms_secrets.test.plaintext.foo}");

    let data = registry.data("data_type", "data_id", json!({})).unwrap();
    let baz = data.reference("baz").unwrap();
    assert_eq!(baz.index(0), "${data.data_type.data_id.baz.0}");
    assert_eq!(
        baz.index(1).key("resource_collection").attr("resource"),
        "${data.data_type.data_id.baz.1.resource_collection.resource}"
    );
}

#[test]
fn test_references_embed_as_strings() {
    let registry = Registry::new();
    let sg = registry.resource("aws_security_group", "sg", json!({})).unwrap();
    let web = registry
        .resource(
            "aws_instance",
            "web",
            json!({"vpc_security_group_ids": [sg.reference("id").unwrap()]}),
        )
        .unwrap();

    assert_eq!(
        web.values()["vpc_security_group_ids"],
        json!(["${aws_security_group.sg.id}"])
    );
}

#[test]
fn test_module_references() {
    let registry = Registry::new();
    let module = registry
        .module(
            "consul",
            json!({"source": "hashicorp/consul/aws", "version": "0.0.5", "servers": 3}),
        )
        .unwrap();

    assert_eq!(
        module.build().to_value(),
        json!({"module": {"consul": {"source": "hashicorp/consul/aws", "version": "0.0.5", "servers": 3}}})
    );
    assert_eq!(module.get("dns").unwrap(), "${module.consul.dns}");
}

#[test]
fn test_terraform_settings() {
    let registry = Registry::new();
    let tf = registry
        .terraform(json!({"backend": {"s3": {"bucket": "bucket"}}}))
        .unwrap();

    assert_eq!(
        tf.build().to_value(),
        json!({"terraform": {"backend": {"s3": {"bucket": "bucket"}}}})
    );
    assert!(tf.get("backend").is_ok());
    assert!(tf.get("required_version").is_err());
}

#[test]
fn test_equality() {
    let registry = Registry::new();

    let p1 = registry.provider("mysql", json!({"host": "db"})).unwrap();
    let p2 = registry.provider("mysql", json!({"host": "db"})).unwrap();
    let v1 = registry.variable("mysql", json!({"host": "db"})).unwrap();
    assert_eq!(p1, p2);
    assert_ne!(p1, v1);

    let r1 = registry.resource("aws_security_group", "sg", json!({"name": "sg"})).unwrap();
    let r2 = registry.resource("aws_security_group", "sg", json!({"name": "sg"})).unwrap();
    let d1 = registry.data("aws_security_group", "sg", json!({"name": "sg"})).unwrap();
    assert_eq!(r1, r2);
    assert_ne!(r1, d1);
}
