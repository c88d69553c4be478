//! Resource collection tests: input resolution, variants, validation and finalization

use serde_json::{Value, json};
use tfdeclare::{
    DeclareError, DeclareResult, Field, FieldType, Inputs, Object, Registry, ResourceCollection,
    Schema, Variant,
};

#[derive(Default)]
struct TestCollection {
    res1: Option<Object>,
}

impl ResourceCollection for TestCollection {
    fn schema() -> Schema {
        Schema::new()
            .field(Field::new("foo", FieldType::String))
            .field(Field::new("bar", FieldType::String).with_default("default bar!"))
    }

    fn create_resources(&mut self, inputs: &Inputs, registry: &Registry) -> DeclareResult<()> {
        let foo = inputs.require("foo")?.clone();
        self.res1 = Some(registry.resource("res1", "foo", json!({"foo": foo}))?);
        Ok(())
    }
}

fn make_collection(registry: &Registry) -> DeclareResult<tfdeclare::Collection<TestCollection>> {
    registry.collection(
        TestCollection::default(),
        json!({
            "foo": "foo!",
            "prod_variant": {"bar": "prod bar!"},
            "stage_variant": {"bar": "stage bar!"},
        }),
    )
}

#[test]
fn test_resource_collection() {
    let registry = Registry::new();
    let tc = registry
        .collection(TestCollection::default(), json!({"foo": "foo!"}))
        .unwrap();

    assert_eq!(tc.input("foo"), Some(&json!("foo!")));
    let res1 = tc.borrow().res1.clone().unwrap();
    assert_eq!(res1.get("foo").unwrap(), "foo!");
    assert_eq!(res1.get("id").unwrap(), "${res1.foo.id}");

    let err = registry
        .collection(TestCollection::default(), json!({}))
        .err()
        .unwrap();
    assert_eq!(
        err,
        DeclareError::MissingInput {
            collection: "TestCollection".to_owned(),
            input: "foo".to_owned(),
        }
    );
}

#[test]
fn test_collection_variants() {
    let registry = Registry::new();

    let tc = make_collection(&registry).unwrap();
    assert_eq!(tc.inputs().get_str("bar"), Some("default bar!"));

    {
        let _prod = registry.enter_variant(Variant::new("prod"));
        let tc = make_collection(&registry).unwrap();
        assert_eq!(tc.inputs().get_str("bar"), Some("prod bar!"));
    }

    {
        let _stage = registry.enter_variant(Variant::new("stage"));
        let tc = make_collection(&registry).unwrap();
        assert_eq!(tc.inputs().get_str("bar"), Some("stage bar!"));
    }
}

#[test]
fn test_variant_defaults() {
    let registry = Registry::new();

    {
        let _testing = registry
            .enter_variant(Variant::new("testing").with_default("foo", "variant default foo!"));
        let tc = registry.collection(TestCollection::default(), json!({})).unwrap();
        assert_eq!(tc.inputs().get_str("foo"), Some("variant default foo!"));
    }

    {
        let _testing2 = registry
            .enter_variant(Variant::new("testing2").with_default("bar", "variant default bar!"));
        let tc = registry
            .collection(TestCollection::default(), json!({"foo": "test foo!"}))
            .unwrap();
        assert_eq!(tc.inputs().get_str("foo"), Some("test foo!"));
        assert_eq!(tc.inputs().get_str("bar"), Some("variant default bar!"));
    }

    {
        let _testing3 = registry.enter_variant(Variant::new("testing3"));
        let tc = registry
            .collection(
                TestCollection::default(),
                json!({"foo": "test foo!", "testing3_variant": {"foo": "testing3 foo!"}}),
            )
            .unwrap();
        assert_eq!(tc.inputs().get_str("foo"), Some("testing3 foo!"));
        assert_eq!(tc.inputs().get_str("bar"), Some("default bar!"));
    }
}

#[test]
fn test_unknown_inputs_are_rejected() {
    let registry = Registry::new();

    let err = registry
        .collection(TestCollection::default(), json!({"foo": "x", "qux": 1}))
        .err()
        .unwrap();
    assert!(matches!(err, DeclareError::Configuration { .. }));
    assert!(err.to_string().contains("qux"));

    let err = registry
        .collection(
            TestCollection::default(),
            json!({"foo": "x", "prod_variant": {"nope": 1}}),
        )
        .err()
        .unwrap();
    assert!(err.to_string().contains("nope"));
}

struct Validated;

impl ResourceCollection for Validated {
    fn schema() -> Schema {
        Schema::new()
            .field(Field::new("foo", FieldType::String).with_check(|value| {
                if value.as_str().is_some_and(|s| s.ends_with('!')) {
                    Ok(())
                } else {
                    Err("foo must end in !".to_owned())
                }
            }))
            .field(Field::new("bar", FieldType::String).with_default(""))
            .field(
                Field::new("baz", FieldType::String)
                    .with_constraint(json!({"pattern": "^[^@]+@[^@]+\\.[^@]+$"})),
            )
            .field(
                Field::new("count", FieldType::Integer)
                    .optional()
                    .with_constraint(json!({"minimum": 1})),
            )
    }

    fn create_resources(&mut self, _inputs: &Inputs, _registry: &Registry) -> DeclareResult<()> {
        Ok(())
    }
}

#[test]
fn test_input_validation() {
    let registry = Registry::new();

    let missing = registry.collection(Validated, json!({"foo": "foo!"})).err().unwrap();
    assert!(matches!(missing, DeclareError::MissingInput { .. }));

    let bad_email = registry
        .collection(Validated, json!({"foo": "foo!", "baz": "not an email"}))
        .err()
        .unwrap();
    assert!(matches!(bad_email, DeclareError::Validation { ref input, .. } if input == "baz"));

    let no_bang = registry
        .collection(Validated, json!({"foo": "no-exclamation-mark", "baz": "baz@baz.com"}))
        .err()
        .unwrap();
    assert_eq!(
        no_bang,
        DeclareError::validation("foo", "foo must end in !")
    );

    let too_few = registry
        .collection(Validated, json!({"foo": "foo!", "baz": "baz@baz.com", "count": "0"}))
        .err()
        .unwrap();
    assert!(matches!(too_few, DeclareError::Validation { ref input, .. } if input == "count"));

    let tc = registry
        .collection(Validated, json!({"foo": "foo!", "baz": "bbq@lol.tld", "count": "3"}))
        .unwrap();
    assert_eq!(tc.inputs().get_str("baz"), Some("bbq@lol.tld"));
    assert_eq!(tc.inputs().get_i64("count"), Some(3));
    assert_eq!(tc.inputs().get_str("bar"), Some(""));
}

#[test]
fn test_optional_inputs_resolve_to_null() {
    let registry = Registry::new();
    let tc = registry
        .collection(Validated, json!({"foo": "foo!", "baz": "a@b.c", "count": null}))
        .unwrap();

    assert!(!tc.inputs().is_set("count"));
    assert_eq!(tc.input("count"), Some(&Value::Null));
}

struct Strings;

impl ResourceCollection for Strings {
    fn schema() -> Schema {
        Schema::new()
            .field(Field::new("foo", FieldType::String))
            .field(Field::new("bar", FieldType::String))
    }

    fn create_resources(&mut self, _inputs: &Inputs, _registry: &Registry) -> DeclareResult<()> {
        Ok(())
    }
}

#[test]
fn test_references_as_string_inputs() {
    let registry = Registry::new();
    let data = registry.data("data_type", "data_id", json!({})).unwrap();
    let baz = data.reference("baz").unwrap();

    let tc = registry
        .collection(Strings, json!({"foo": baz, "bar": baz.key("bbq")}))
        .unwrap();
    assert_eq!(tc.inputs().get_str("foo"), Some("${data.data_type.data_id.baz}"));
    assert_eq!(tc.inputs().get_str("bar"), Some("${data.data_type.data_id.baz.bbq}"));

    let tc = registry
        .collection(
            Strings,
            json!({
                "foo": baz.index(0).key("resource_collection").key("resource"),
                "bar": baz.index(1).attr("resource_collection").attr("resource"),
            }),
        )
        .unwrap();
    assert_eq!(
        tc.inputs().get_str("foo"),
        Some("${data.data_type.data_id.baz.0.resource_collection.resource}")
    );
    assert_eq!(
        tc.inputs().get_str("bar"),
        Some("${data.data_type.data_id.baz.1.resource_collection.resource}")
    );
}

#[test]
fn test_relative_file() {
    let registry = Registry::new();
    let tc = registry
        .collection(TestCollection::default(), json!({"foo": "foo!"}))
        .unwrap();

    assert_eq!(
        tc.borrow().relative_file("foo"),
        r#"${file("${path.module}/tests/foo")}"#
    );
}

#[test]
fn test_mock_arguments() {
    struct Mocked;

    impl ResourceCollection for Mocked {
        fn schema() -> Schema {
            Schema::new()
                .field(Field::new("foo", FieldType::String))
                .field(Field::new("bar", FieldType::String))
                .field(Field::new("baz", FieldType::Integer))
                .field(Field::new("nested", FieldType::Object))
                .field(Field::new("size", FieldType::Integer).with_default(3))
        }

        fn create_resources(&mut self, _inputs: &Inputs, _registry: &Registry) -> DeclareResult<()> {
            Ok(())
        }
    }

    let registry = Registry::new();
    let tc = registry.collection(Mocked, Mocked::schema().mock_arguments()).unwrap();

    assert!(tc.inputs().is_set("foo"));
    assert!(tc.inputs().is_set("bar"));
    assert_eq!(tc.inputs().get_i64("baz"), Some(0));
    assert_eq!(tc.input("nested"), Some(&json!({})));
    assert_eq!(tc.inputs().get_i64("size"), Some(3));
}

/// Declares a security group and, once every collection exists, a rule
/// pointing at the group of the collection named by `peer`
#[derive(Default)]
struct Service {
    group: Option<Object>,
}

impl ResourceCollection for Service {
    fn schema() -> Schema {
        Schema::new()
            .field(Field::new("name", FieldType::String))
            .field(Field::new("peer", FieldType::String).optional())
    }

    fn create_resources(&mut self, inputs: &Inputs, registry: &Registry) -> DeclareResult<()> {
        let name = inputs.require("name")?.clone();
        let object_name = name.as_str().unwrap_or_default();
        self.group = Some(registry.resource(
            "aws_security_group",
            object_name,
            json!({"name": name}),
        )?);
        Ok(())
    }

    fn finalize_resources(&mut self, inputs: &Inputs, registry: &Registry) -> DeclareResult<()> {
        let Some(peer) = inputs.get_str("peer") else {
            return Ok(());
        };
        let name = inputs.get_str("name").unwrap_or_default();
        let peer_group = registry
            .instances(tfdeclare::Kind::Resource)
            .into_iter()
            .find(|object| object.object_type().as_deref() == Some("aws_security_group") && object.name() == peer)
            .ok_or_else(|| DeclareError::configuration(format!("No group named {peer}")))?;

        registry.resource(
            "aws_security_group_rule",
            &format!("{name}_from_{peer}"),
            json!({
                "security_group_id": self.group.as_ref().map(|group| group.reference("id")).transpose()?,
                "source_security_group_id": peer_group.reference("id")?,
                "finalized_order": registry.instances(tfdeclare::Kind::Resource).len(),
            }),
        )?;
        Ok(())
    }
}

#[test]
fn test_finalize_runs_newest_first() {
    let registry = Registry::new();
    registry
        .collection(Service::default(), json!({"name": "api", "peer": "web"}))
        .unwrap();
    registry
        .collection(Service::default(), json!({"name": "web", "peer": "api"}))
        .unwrap();

    let document = registry.compile().unwrap().to_value();
    let rules = &document["resource"]["aws_security_group_rule"];

    // Two groups exist before either rule; web finalizes first
    assert_eq!(rules["web_from_api"]["finalized_order"], json!(2));
    assert_eq!(rules["api_from_web"]["finalized_order"], json!(3));
    assert_eq!(
        rules["api_from_web"]["source_security_group_id"],
        json!("${aws_security_group.web.id}")
    );
    assert_eq!(
        rules["web_from_api"]["security_group_id"],
        json!("${aws_security_group.web.id}")
    );
}

#[test]
fn test_compiling_twice_finalizes_once() {
    let registry = Registry::new();
    registry
        .collection(Service::default(), json!({"name": "api", "peer": "web"}))
        .unwrap();
    registry
        .collection(Service::default(), json!({"name": "web", "peer": "api"}))
        .unwrap();

    let first = registry.compile().unwrap().to_value();
    let second = registry.compile().unwrap().to_value();

    assert_eq!(first, second);
    assert_eq!(registry.instances(tfdeclare::Kind::Resource).len(), 4);
}

/// Declares a `Leaf` from inside its own `create_resources`
struct Branch;

struct Leaf;

fn mark_finalized(registry: &Registry, name: &str) -> DeclareResult<()> {
    let order = registry.instances(tfdeclare::Kind::Output).len();
    registry.output(&format!("{name}_finalized"), json!({"value": order}))?;
    Ok(())
}

impl ResourceCollection for Branch {
    fn schema() -> Schema {
        Schema::new().field(Field::new("fail", FieldType::Boolean).with_default(false))
    }

    fn create_resources(&mut self, inputs: &Inputs, registry: &Registry) -> DeclareResult<()> {
        registry.resource("null_resource", "branch", json!({}))?;
        registry.collection(Leaf, json!({}))?;
        if inputs.get_bool("fail") == Some(true) {
            return Err(DeclareError::configuration("branch failed"));
        }
        Ok(())
    }

    fn finalize_resources(&mut self, _inputs: &Inputs, registry: &Registry) -> DeclareResult<()> {
        mark_finalized(registry, "branch")
    }
}

impl ResourceCollection for Leaf {
    fn schema() -> Schema {
        Schema::new()
    }

    fn create_resources(&mut self, _inputs: &Inputs, registry: &Registry) -> DeclareResult<()> {
        registry.resource("null_resource", "leaf", json!({}))?;
        Ok(())
    }

    fn finalize_resources(&mut self, _inputs: &Inputs, registry: &Registry) -> DeclareResult<()> {
        mark_finalized(registry, "leaf")
    }
}

#[test]
fn test_nested_collections_finalize_before_their_parent() {
    let registry = Registry::new();
    registry.collection(Branch, json!({})).unwrap();

    let document = registry.compile().unwrap().to_value();
    assert_eq!(document["output"]["leaf_finalized"]["value"], json!(0));
    assert_eq!(document["output"]["branch_finalized"]["value"], json!(1));
}

#[test]
fn test_failed_collection_is_not_finalized() {
    let registry = Registry::new();
    let err = registry.collection(Branch, json!({"fail": true})).err().unwrap();
    assert!(matches!(err, DeclareError::Configuration { .. }));

    let document = registry.compile().unwrap().to_value();
    assert_eq!(document["output"]["leaf_finalized"]["value"], json!(0));
    assert!(document["output"].get("branch_finalized").is_none());
}

struct C1;

impl ResourceCollection for C1 {
    fn schema() -> Schema {
        Schema::new()
            .field(Field::new("foo", FieldType::String))
            .field(Field::new("size", FieldType::Integer).with_default(1))
    }

    fn create_resources(&mut self, _inputs: &Inputs, _registry: &Registry) -> DeclareResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct C2 {
    foo: Option<String>,
}

impl ResourceCollection for C2 {
    fn schema() -> Schema {
        Schema::new().field(Field::collection::<C1, _>("c1"))
    }

    fn create_resources(&mut self, inputs: &Inputs, _registry: &Registry) -> DeclareResult<()> {
        self.foo = inputs
            .nested("c1")
            .and_then(|c1| c1.get_str("foo").map(str::to_owned));
        Ok(())
    }
}

#[test]
fn test_collection_type() {
    let registry = Registry::new();
    let c1 = registry.collection(C1, json!({"foo": "foo"})).unwrap();
    let c2 = registry.collection(C2::default(), json!({"c1": c1})).unwrap();

    assert_eq!(c2.borrow().foo.as_deref(), Some("foo"));
    let nested = c2.inputs().nested("c1").unwrap();
    assert_eq!(nested.get_str("foo"), Some("foo"));
    assert_eq!(nested.get_i64("size"), Some(1));

    let plain = registry
        .collection(C2::default(), json!({"c1": {"foo": 7, "size": "2"}}))
        .unwrap();
    assert_eq!(plain.input("c1"), Some(&json!({"foo": "7", "size": 2})));
}

#[test]
fn test_collection_type_is_validated() {
    let registry = Registry::new();

    let err = registry
        .collection(C2::default(), json!({"c1": {}}))
        .err()
        .unwrap();
    assert_eq!(
        err,
        DeclareError::MissingInput {
            collection: "C1".to_owned(),
            input: "foo".to_owned(),
        }
    );

    let err = registry
        .collection(C2::default(), json!({"c1": "foo"}))
        .err()
        .unwrap();
    assert!(matches!(err, DeclareError::Validation { ref input, .. } if input == "c1"));

    let err = registry
        .collection(C2::default(), json!({"c1": {"foo": "x", "bar": 1}}))
        .err()
        .unwrap();
    assert!(err.to_string().contains("bar"));
}

#[test]
fn test_mock_collection_arguments() {
    assert_eq!(
        C2::schema().mock_arguments(),
        json!({"c1": {"foo": "mock-foo", "size": 1}})
    );

    let registry = Registry::new();
    let c2 = registry
        .collection(C2::default(), C2::schema().mock_arguments())
        .unwrap();
    assert!(c2.inputs().nested("c1").unwrap().is_set("foo"));
    assert_eq!(c2.borrow().foo.as_deref(), Some("mock-foo"));
}
