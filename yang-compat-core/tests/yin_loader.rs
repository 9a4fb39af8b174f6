use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use yang_compat_core::model::{
    format_scaled, BuiltinType, ElementCountConstraint, Interval, ModuleModel, NodeKind,
    PathSegment, SchemaPath, Status,
};
use yang_compat_core::{validate, FindingKind, LoadError, ModuleLoader, RfcVersion};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn load_inline(body: &str) -> Result<ModuleModel, LoadError> {
    let document = format!(
        r#"<module name="inline" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
             <namespace uri="urn:inline"/>
             <prefix value="in"/>
             <revision date="2024-03-01"/>
             {body}
           </module>"#
    );
    ModuleLoader::default().load_bytes(document.as_bytes(), None)
}

fn path(module: &str, names: &[&str]) -> SchemaPath {
    names.iter().fold(SchemaPath::root(), |path, name| {
        path.child(PathSegment::new(module, *name))
    })
}

#[test]
fn loads_fixture_with_imported_types_and_groupings() {
    let module = ModuleLoader::default()
        .load_file(&fixture("fixtures/example-system@2023-01-01.yin"))
        .expect("fixture loads");

    assert_eq!(module.name, "example-system");
    assert_eq!(module.prefix, "sys");
    assert_eq!(module.revision.map(|r| r.to_string()).as_deref(), Some("2023-01-01"));
    assert_eq!(module.identities.len(), 3);

    let port = module
        .find_node(&path("example-system", &["system", "server", "port"]))
        .expect("port from grouping");
    let port_type = port.type_def.as_ref().expect("typed");
    assert_eq!(port_type.builtin_kind(), Some(BuiltinType::Uint16));
    assert_eq!(port_type.qname.local_name, "port-number");
    assert_eq!(port_type.qname.namespace, "urn:example:types");
    assert_eq!(port_type.default_value.as_deref(), Some("830"));
    assert_eq!(port.qname.namespace, "urn:example:system");

    let created = module
        .find_node(&path("example-system", &["system", "user", "created"]))
        .expect("leaf from imported grouping");
    assert_eq!(created.config, Some(false));

    let mtu = module
        .find_node(&path("example-system", &["system", "mtu"]))
        .and_then(|node| node.type_def.as_ref())
        .expect("mtu type");
    assert_eq!(mtu.units.as_deref(), Some("octets"));
    assert_eq!(
        mtu.range().map(|range| range.intervals.clone()),
        Some(vec![Interval::new(68, 9000)])
    );

    let restart = module.find_rpc("restart").expect("rpc");
    let io: Vec<NodeKind> = restart.children.iter().map(|child| child.kind).collect();
    assert_eq!(io, [NodeKind::Input, NodeKind::Output]);
    assert_eq!(restart.children[0].children[0].config, None);
    assert_eq!(module.notifications.len(), 1);
}

#[test]
fn fixture_revisions_report_expected_breakage() {
    let old = ModuleLoader::default()
        .load_file(&fixture("fixtures/example-system@2023-01-01.yin"))
        .expect("old loads");
    let new = ModuleLoader::default()
        .load_file(&fixture("fixtures/example-system@2024-01-01.yin"))
        .expect("new loads");

    let catalog = validate(&old, &new, RfcVersion::Rfc7950);
    let kinds: Vec<FindingKind> = catalog.iter().map(|finding| finding.kind).collect();
    assert_eq!(
        kinds,
        [
            FindingKind::ReferenceError,
            FindingKind::LengthError,
            FindingKind::RangeError,
            FindingKind::MissingEnumError,
            FindingKind::MaxElementsError,
            FindingKind::MissingNodeError,
        ]
    );

    let reflexive: Vec<FindingKind> = validate(&old, &old, RfcVersion::Rfc7950)
        .iter()
        .map(|finding| finding.kind)
        .collect();
    assert_eq!(reflexive, [FindingKind::RevisionError]);
}

#[test]
fn nested_typedefs_shadow_module_typedefs() {
    let module = load_inline(
        r#"<typedef name="label"><type name="string"><length value="1..32"/></type></typedef>
           <container name="outer">
             <typedef name="label"><type name="int8"/></typedef>
             <leaf name="inner"><type name="label"/></leaf>
           </container>
           <leaf name="top"><type name="label"/></leaf>"#,
    )
    .expect("loads");

    let inner = module
        .find_node(&path("inline", &["outer", "inner"]))
        .and_then(|node| node.type_def.as_ref())
        .expect("inner type");
    assert_eq!(inner.builtin_kind(), Some(BuiltinType::Int8));

    let top = module.children[1].type_def.as_ref().expect("top type");
    assert_eq!(top.builtin_kind(), Some(BuiltinType::String));
    assert_eq!(
        top.length().map(|length| length.intervals.clone()),
        Some(vec![Interval::new(1, 32)])
    );
    assert_eq!(module.typedefs.len(), 1);
}

#[test]
fn restrictions_refine_the_base_type() {
    let module = load_inline(
        r#"<typedef name="percent">
             <type name="decimal64">
               <fraction-digits value="2"/>
               <range value="0..100"/>
             </type>
           </typedef>
           <leaf name="load">
             <type name="percent"><range value="min..50.5"/></type>
           </leaf>
           <leaf name="state">
             <type name="enumeration">
               <enum name="up"><value value="1"/></enum>
               <enum name="down"/>
               <enum name="testing"><status value="deprecated"/></enum>
             </type>
           </leaf>
           <leaf name="flags">
             <type name="bits">
               <bit name="a"/>
               <bit name="b"><position value="4"/></bit>
               <bit name="c"/>
             </type>
           </leaf>"#,
    )
    .expect("loads");

    let load = module.children[0].type_def.as_ref().expect("load type");
    let range = load.range().expect("range");
    assert_eq!(range.fraction_digits, 2);
    assert_eq!(range.intervals, [Interval::new(0, 5050)]);
    assert_eq!(format_scaled(range.intervals[0].max, 2), "50.50");

    let state = module.children[1].type_def.as_ref().expect("state type");
    let values: Vec<(&str, i32)> = state.enums().iter().map(|e| (e.name.as_str(), e.value)).collect();
    assert_eq!(values, [("up", 1), ("down", 2), ("testing", 3)]);
    assert_eq!(state.enums()[2].status, Status::Deprecated);

    let flags = module.children[2].type_def.as_ref().expect("flags type");
    let positions: Vec<u32> = flags.bits().iter().map(|bit| bit.position).collect();
    assert_eq!(positions, [0, 4, 5]);
}

#[test]
fn node_statements_are_captured() {
    let module = load_inline(
        r#"<container name="c">
             <config value="false"/>
             <must condition="count(x) &gt; 0">
               <error-message><value>need x</value></error-message>
             </must>
             <when condition="../enabled"/>
             <leaf-list name="x">
               <type name="string"/>
               <min-elements value="1"/>
               <max-elements value="unbounded"/>
             </leaf-list>
             <choice name="transport">
               <mandatory value="true"/>
               <leaf name="tcp"><type name="empty"/></leaf>
               <case name="udp"><leaf name="port"><type name="uint16"/></leaf></case>
             </choice>
           </container>"#,
    )
    .expect("loads");

    let container = &module.children[0];
    assert_eq!(container.config, Some(false));
    assert_eq!(container.when.as_deref(), Some("../enabled"));
    assert_eq!(container.musts[0].xpath, "count(x) > 0");
    assert_eq!(container.musts[0].error_message.as_deref(), Some("need x"));

    let list = container.find_child("x").expect("leaf-list");
    assert_eq!(list.config, Some(false));
    assert_eq!(
        list.element_count,
        Some(ElementCountConstraint {
            min: Some(1),
            max: None
        })
    );

    let choice = container.find_child("transport").expect("choice");
    assert_eq!(choice.mandatory, Some(true));
    let cases: Vec<(&str, NodeKind)> = choice
        .children
        .iter()
        .map(|case| (case.local_name(), case.kind))
        .collect();
    assert_eq!(cases, [("tcp", NodeKind::Case), ("udp", NodeKind::Case)]);
    assert_eq!(choice.children[0].children[0].kind, NodeKind::Leaf);
    assert!(module
        .find_node(&path("inline", &["c", "transport", "udp", "port"]))
        .is_some());
}

#[test]
fn uses_applies_refine_and_when() {
    let module = load_inline(
        r#"<grouping name="limits">
             <leaf name="max"><type name="uint32"/></leaf>
             <list name="entry">
               <key value="id"/>
               <leaf name="id"><type name="string"/></leaf>
             </list>
           </grouping>
           <container name="box">
             <uses name="limits">
               <when condition="../enabled = 'true'"/>
               <refine target-node="max">
                 <mandatory value="true"/>
                 <default value="10"/>
                 <reference><text>RFC 9999</text></reference>
               </refine>
               <refine target-node="in:entry">
                 <config value="false"/>
                 <max-elements value="4"/>
               </refine>
             </uses>
           </container>"#,
    )
    .expect("loads");

    let max = module
        .find_node(&path("inline", &["box", "max"]))
        .expect("refined leaf");
    assert_eq!(max.mandatory, Some(true));
    assert_eq!(max.reference.as_deref(), Some("RFC 9999"));
    assert_eq!(max.when.as_deref(), Some("../enabled = 'true'"));
    assert_eq!(
        max.type_def.as_ref().and_then(|t| t.default_value.as_deref()),
        Some("10")
    );

    let entry = module
        .find_node(&path("inline", &["box", "entry"]))
        .expect("refined list");
    assert_eq!(entry.config, Some(false));
    assert_eq!(entry.children[0].config, Some(false));
    assert_eq!(
        entry.element_count,
        Some(ElementCountConstraint {
            min: None,
            max: Some(4)
        })
    );
}

#[test]
fn uses_when_is_combined_with_node_when() {
    let module = load_inline(
        r#"<grouping name="extras">
             <leaf name="plain"><type name="string"/></leaf>
             <leaf name="guarded">
               <when condition="../mode = 'full'"/>
               <type name="string"/>
             </leaf>
           </grouping>
           <container name="box">
             <uses name="extras">
               <when condition="../enabled = 'true'"/>
             </uses>
           </container>"#,
    )
    .expect("loads");

    let plain = module
        .find_node(&path("inline", &["box", "plain"]))
        .expect("plain leaf");
    assert_eq!(plain.when.as_deref(), Some("../enabled = 'true'"));

    let guarded = module
        .find_node(&path("inline", &["box", "guarded"]))
        .expect("guarded leaf");
    assert_eq!(
        guarded.when.as_deref(),
        Some("(../mode = 'full') and (../enabled = 'true')")
    );
}

#[test]
fn added_uses_when_is_seen_on_nodes_with_own_when() {
    let grouping = r#"<grouping name="extras">
             <leaf name="guarded">
               <when condition="../mode = 'full'"/>
               <type name="string"/>
             </leaf>
           </grouping>"#;
    let old = load_inline(&format!(
        r#"{grouping}<container name="box"><uses name="extras"/></container>"#
    ))
    .expect("old loads");
    let new = load_inline(&format!(
        r#"{grouping}<container name="box">
             <uses name="extras"><when condition="../enabled = 'true'"/></uses>
           </container>"#
    ))
    .expect("new loads");

    let catalog = validate(&old, &new, RfcVersion::Rfc7950);
    assert_eq!(catalog.count_of(FindingKind::CheckWhenWarning), 1);
}

const NAME_TYPEDEF: &str = r#"<typedef name="name">
             <type name="string"/>
             <reference><text>RFC 1234</text></reference>
           </typedef>"#;

#[test]
fn inline_restriction_keeps_typedef_reference() {
    let old = load_inline(&format!(
        r#"{NAME_TYPEDEF}<leaf name="label"><type name="name"/></leaf>"#
    ))
    .expect("old loads");
    let new = load_inline(&format!(
        r#"{NAME_TYPEDEF}<leaf name="label"><type name="name"><length value="0..max"/></type></leaf>"#
    ))
    .expect("new loads");

    let label = new.children[0].type_def.as_ref().expect("label type");
    assert_eq!(label.reference.as_deref(), Some("RFC 1234"));

    let catalog = validate(&old, &new, RfcVersion::Rfc7950);
    assert_eq!(catalog.count_of(FindingKind::ReferenceError), 0);
}

#[test]
fn typedef_reference_removal_is_seen_through_inline_restriction() {
    let leaf = r#"<leaf name="label"><type name="name"><length value="1..10"/></type></leaf>"#;
    let old = load_inline(&format!("{NAME_TYPEDEF}{leaf}")).expect("old loads");
    let new = load_inline(&format!(
        r#"<typedef name="name"><type name="string"/></typedef>{leaf}"#
    ))
    .expect("new loads");

    let catalog = validate(&old, &new, RfcVersion::Rfc7950);
    assert_eq!(catalog.count_of(FindingKind::ReferenceError), 1);
}

#[test]
fn augment_targets_resolve_prefixes() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("base@2020-01-01.yin"),
        r#"<module name="base" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
             <namespace uri="urn:base"/>
             <prefix value="b"/>
             <container name="interfaces"/>
             <rpc name="reset"/>
           </module>"#,
    )
    .expect("write base");
    let main = dir.path().join("ext.yin");
    fs::write(
        &main,
        r#"<module name="ext" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
             <namespace uri="urn:ext"/>
             <prefix value="x"/>
             <import module="base"><prefix value="b"/></import>
             <augment target-node="/b:interfaces">
               <leaf name="speed"><type name="uint64"/></leaf>
             </augment>
             <augment target-node="/b:reset/b:input">
               <leaf name="force"><type name="boolean"/></leaf>
             </augment>
           </module>"#,
    )
    .expect("write ext");

    let module = ModuleLoader::default().load_file(&main).expect("loads");
    assert_eq!(module.augmentations.len(), 2);
    assert_eq!(module.augmentations[0].target.to_string(), "/base:interfaces");
    assert_eq!(module.augmentations[0].children[0].config, Some(true));
    assert_eq!(module.augmentations[1].target.to_string(), "/base:reset/base:input");
    assert_eq!(module.augmentations[1].children[0].config, None);
}

#[test]
fn imports_are_found_on_search_paths() {
    let modules = tempdir().expect("modules dir");
    let work = tempdir().expect("work dir");
    fs::write(
        modules.path().join("units.yin"),
        r#"<module name="units" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
             <namespace uri="urn:units"/>
             <prefix value="u"/>
             <typedef name="celsius"><type name="int16"/><units name="C"/></typedef>
           </module>"#,
    )
    .expect("write units");
    let main = work.path().join("sensor.yin");
    fs::write(
        &main,
        r#"<module name="sensor" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
             <namespace uri="urn:sensor"/>
             <prefix value="s"/>
             <import module="units"><prefix value="u"/></import>
             <leaf name="temperature"><type name="u:celsius"/></leaf>
           </module>"#,
    )
    .expect("write sensor");

    let err = ModuleLoader::default()
        .load_file(&main)
        .expect_err("units is not next to sensor");
    assert!(matches!(err, LoadError::ImportNotFound { .. }));

    let module = ModuleLoader::new(vec![modules.path().to_path_buf()])
        .load_file(&main)
        .expect("loads with search path");
    let temperature = module.children[0].type_def.as_ref().expect("type");
    assert_eq!(temperature.units.as_deref(), Some("C"));
    assert_eq!(temperature.builtin_kind(), Some(BuiltinType::Int16));
}

#[test]
fn broken_definitions_are_load_errors() {
    let unresolved = load_inline(r#"<leaf name="a"><type name="nope"/></leaf>"#);
    assert!(matches!(unresolved, Err(LoadError::UnresolvedType { .. })));

    let no_base = load_inline(r#"<leaf name="a"><type name="identityref"/></leaf>"#);
    assert!(matches!(no_base, Err(LoadError::MissingStatement { .. })));

    let recursive = load_inline(
        r#"<grouping name="g"><container name="c"><uses name="g"/></container></grouping>
           <uses name="g"/>"#,
    );
    assert!(matches!(recursive, Err(LoadError::TooDeep { .. })));

    let inverted = load_inline(
        r#"<leaf name="a"><type name="uint8"><range value="10..1"/></type></leaf>"#,
    );
    assert!(matches!(inverted, Err(LoadError::InvalidValue { .. })));

    let unknown_prefix = load_inline(r#"<leaf name="a"><type name="zz:thing"/></leaf>"#);
    assert!(matches!(unknown_prefix, Err(LoadError::UnknownPrefix { .. })));
}
