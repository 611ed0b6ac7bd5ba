use bindery_template::{TemplateError, parse_yaml};

#[test]
fn mapping_format_builds_the_same_tree() {
    let src = r#"
Frame:
  pack-fill: both
  children:
    - Label:
        name: title
        text: "[title]"
    - Button: Press me
    - Scale:
        from: 0
        to: 10.5
        showvalue: true
"#;
    let root = parse_yaml(src).expect("parse ok");
    assert_eq!(root.tag, "Frame");
    assert_eq!(root.get("pack-fill"), Some("both"));
    assert_eq!(root.children.len(), 3);
    assert_eq!(root.children[0].text.as_deref(), Some("[title]"));
    assert_eq!(root.children[0].get("name"), Some("title"));
    assert_eq!(root.children[1].text.as_deref(), Some("Press me"));
    let scale = &root.children[2];
    assert_eq!(scale.get("from"), Some("0"));
    assert_eq!(scale.get("to"), Some("10.5"));
    assert_eq!(scale.get("showvalue"), Some("true"));
}

#[test]
fn empty_document_is_rejected() {
    assert!(matches!(parse_yaml(""), Err(TemplateError::Empty)));
}

#[test]
fn elements_need_exactly_one_tag() {
    let err = parse_yaml("Frame: ~\nLabel: ~\n").unwrap_err();
    assert!(matches!(err, TemplateError::Shape(_)), "got {err:?}");
}

#[test]
fn children_must_be_a_list() {
    let err = parse_yaml("Frame:\n  children: nope\n").unwrap_err();
    assert!(matches!(err, TemplateError::Shape(_)), "got {err:?}");
}

#[test]
fn invalid_yaml_surfaces_the_parser_error() {
    let err = parse_yaml("Frame: [unclosed").unwrap_err();
    assert!(matches!(err, TemplateError::Yaml(_)), "got {err:?}");
}
