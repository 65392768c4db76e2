//! AST to nested object conversion
//!
//! Each element becomes a single-key object `{ tag_name: body }`. The body
//! holds attributes as string fields (document order), then either
//! `content` when the only child is text, or a `children` array.

use serde_json::{Map, Value};

use crate::dom::{Element, Node, Root};

/// Field holding text content
pub const CONTENT_KEY: &str = "content";
/// Field holding the child array
pub const CHILDREN_KEY: &str = "children";

/// Convert a parsed tree to a nested object
///
/// A root whose only child is an element converts to that element's object.
pub fn ast_to_value(root: &Root) -> Value {
    match root.children.as_slice() {
        [Node::Element(element)] => element_to_value(element),
        children => fold(Frame::new(None, children)),
    }
}

/// `{ tag_name: body }` for one element
pub fn element_to_value(element: &Element) -> Value {
    fold(Frame::new(Some(element), &element.children))
}

/// Body under construction; `element` is `None` for the root
struct Frame<'a> {
    element: Option<&'a Element>,
    fields: Map<String, Value>,
    pending: std::slice::Iter<'a, Node>,
    children: Option<Vec<Value>>,
}

impl<'a> Frame<'a> {
    fn new(element: Option<&'a Element>, nodes: &'a [Node]) -> Self {
        let mut fields: Map<String, Value> = element
            .map(|element| {
                element
                    .attributes
                    .iter()
                    .map(|attr| (attr.name.clone(), Value::String(attr.value.clone())))
                    .collect()
            })
            .unwrap_or_default();

        let (pending, children) = match nodes {
            [] => (Default::default(), None),
            [Node::Content(text)] => {
                fields.insert(CONTENT_KEY.to_string(), Value::String(text.clone()));
                (Default::default(), None)
            }
            _ => (nodes.iter(), Some(Vec::with_capacity(nodes.len()))),
        };
        Frame {
            element,
            fields,
            pending,
            children,
        }
    }

    fn push(&mut self, child: Value) {
        if let Some(children) = &mut self.children {
            children.push(child);
        }
    }

    fn finish(mut self) -> Value {
        if let Some(children) = self.children {
            self.fields.insert(CHILDREN_KEY.to_string(), Value::Array(children));
        }
        match self.element {
            Some(element) => {
                let mut object = Map::with_capacity(1);
                object.insert(element.tag_name.clone(), Value::Object(self.fields));
                Value::Object(object)
            }
            None => Value::Object(self.fields),
        }
    }
}

/// Depth-first over an explicit stack of open frames
fn fold(top: Frame<'_>) -> Value {
    let mut current = top;
    let mut parents = Vec::new();
    loop {
        match current.pending.next() {
            Some(Node::Element(element)) => {
                let frame = Frame::new(Some(element), &element.children);
                parents.push(std::mem::replace(&mut current, frame));
            }
            Some(Node::Content(text)) => {
                let mut object = Map::with_capacity(1);
                object.insert(CONTENT_KEY.to_string(), Value::String(text.clone()));
                current.push(Value::Object(object));
            }
            None => {
                let value = current.finish();
                match parents.pop() {
                    Some(parent) => {
                        current = parent;
                        current.push(value);
                    }
                    None => return value,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::options::{ParseOptions, DEFAULT_MAX_DEPTH};
    use crate::{convert_xml, create_ast};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\" ?>";

    fn convert(input: &str) -> Value {
        convert_xml(input, &ParseOptions::new()).unwrap()
    }

    #[test]
    fn test_empty_element() {
        assert_eq!(convert("<a></a>"), json!({ "a": {} }));
    }

    #[test]
    fn test_header_and_attributes() {
        let xml = format!("\n    {XML_HEADER}\n    <a a=\"5\" b=\"hello\"></a>\n    ");
        assert_eq!(convert(&xml), json!({ "a": { "a": "5", "b": "hello" } }));
    }

    #[test]
    fn test_children() {
        let xml = format!(
            "{XML_HEADER}
            <a a=\"5\" b=\"hello\">
            <empty></empty>
            <message>Hello JSON world</message>
            <specialMessage color=\"purple\">Special Hello</specialMessage>
            <nested>
            <message from=\"sender\">Nested hello</message>
            </nested>
            </a>"
        );
        assert_eq!(
            convert(&xml),
            json!({
                "a": {
                    "a": "5",
                    "b": "hello",
                    "children": [
                        { "empty": {} },
                        { "message": { "content": "Hello JSON world" } },
                        { "specialMessage": { "color": "purple", "content": "Special Hello" } },
                        { "nested": { "children": [
                            { "message": { "from": "sender", "content": "Nested hello" } }
                        ] } }
                    ]
                }
            })
        );
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let value = convert("<a z=\"1\" m=\"2\" b=\"3\"/>");
        let keys: Vec<_> = value["a"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "m", "b"]);
    }

    #[test]
    fn test_special_characters_in_names_and_content() {
        assert_eq!(
            convert("<a attrib:n1=\"v1\" attrib-n2=\"v2\">content</a>"),
            json!({ "a": { "attrib:n1": "v1", "attrib-n2": "v2", "content": "content" } })
        );
        assert_eq!(
            convert("<link>https://www.acme.com/abc/A-B_C,d+E/</link>"),
            json!({ "link": { "content": "https://www.acme.com/abc/A-B_C,d+E/" } })
        );
        assert_eq!(convert("<a><child>hi ¬</child></a>"), json!({ "a": { "children": [{ "child": { "content": "hi ¬" } }] } }));
    }

    #[test]
    fn test_entities_pass_through() {
        assert_eq!(
            convert("<R9Z28 train=\"please\">a=b.JD&amp;m3&gt;vP.AG</R9Z28>"),
            json!({ "R9Z28": { "train": "please", "content": "a=b.JD&amp;m3&gt;vP.AG" } })
        );
    }

    #[test]
    fn test_mixed_content() {
        assert_eq!(
            convert("<a><b>Hello</b> unstructured XML</a>"),
            json!({ "a": { "children": [
                { "b": { "content": "Hello" } },
                { "content": " unstructured XML" }
            ] } })
        );
        assert_eq!(
            convert("<p style=\"color: white;\">This is a sentence <b>with</b><c>nested <unstructured>XML</unstructured></c> one word in bold</p>"),
            json!({ "p": {
                "style": "color: white;",
                "children": [
                    { "content": "This is a sentence " },
                    { "b": { "content": "with" } },
                    { "c": { "children": [
                        { "content": "nested " },
                        { "unstructured": { "content": "XML" } }
                    ] } },
                    { "content": " one word in bold" }
                ]
            } })
        );
    }

    #[test]
    fn test_self_closing_children() {
        let xml = "
            <?xml version=\"1.0\" encoding=\"utf-8\" ?>
<root>
  <item>
    <atom:link attrib=\"val\" href=\"http://www.npmjs.com\" />
  </item>
  <item>
    <atom:link attrib=\"val2\" href=\"http://fr.wikipedia.org\" />
  </item>
</root>
            ";
        assert_eq!(
            convert(xml),
            json!({ "root": { "children": [
                { "item": { "children": [{ "atom:link": { "attrib": "val", "href": "http://www.npmjs.com" } }] } },
                { "item": { "children": [{ "atom:link": { "attrib": "val2", "href": "http://fr.wikipedia.org" } }] } }
            ] } })
        );
    }

    #[test]
    fn test_spaces_as_content() {
        assert_eq!(
            convert("<a><child>hello     world</child><child>1    + 1  =  2</child></a>"),
            json!({ "a": { "children": [
                { "child": { "content": "hello     world" } },
                { "child": { "content": "1    + 1  =  2" } }
            ] } })
        );
    }

    #[test]
    fn test_tabs_in_markup() {
        let xml = "<testng-results ignored=\"20\" total=\"40\">\n\t<reporter-output>\n\t</reporter-output>\n</testng-results>";
        assert_eq!(
            convert(xml),
            json!({ "testng-results": { "ignored": "20", "total": "40", "children": [{ "reporter-output": {} }] } })
        );
    }

    #[test]
    fn test_filters() {
        let xml = "
            <a>
                <b></b>
                <c>
                    <d>D</d>
                    C
                </c>
            </a>";
        let options = ParseOptions::new().with_known_element(|n| n == "a" || n == "b");
        assert_eq!(convert_xml(xml, &options).unwrap(), json!({ "a": { "children": [{ "b": {} }] } }));

        let options = ParseOptions::new().with_known_attribute(|n| n == "p1" || n == "p3");
        assert_eq!(
            convert_xml("<a p1='v1' p2='v2' p3='v3'></a>", &options).unwrap(),
            json!({ "a": { "p1": "v1", "p3": "v3" } })
        );
    }

    #[test]
    fn test_root_with_several_children() {
        let root = create_ast("lead <a/><b>x</b>", &ParseOptions::new()).unwrap();
        assert_eq!(
            ast_to_value(&root),
            json!({ "children": [
                { "content": "lead " },
                { "a": {} },
                { "b": { "content": "x" } }
            ] })
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(convert("   "), json!({}));
        assert_eq!(convert("just text"), json!({ "content": "just text" }));
    }

    #[test]
    fn test_attribute_named_content_is_overwritten() {
        assert_eq!(
            convert("<a content=\"attr\">text</a>"),
            json!({ "a": { "content": "text" } })
        );
    }

    /// Walk `{ "a": { "children": [ ... ] } }` one level at a time, taking
    /// each child out of its parent before the parent is dropped
    fn chain_depth(value: Value) -> usize {
        let mut depth = 0;
        let mut current = value;
        loop {
            let Value::Object(mut object) = current else { return depth };
            let Some(Value::Object(mut body)) = object.remove("a") else { return depth };
            depth += 1;
            match body.remove(CHILDREN_KEY) {
                Some(Value::Array(mut children)) if children.len() == 1 => {
                    current = children.pop().unwrap();
                }
                _ => return depth,
            }
        }
    }

    #[test]
    fn test_deep_tree_converts_without_recursion() {
        let depth = 100_000;
        let options = ParseOptions::new().with_max_depth(None);
        let root = create_ast(&"<a>".repeat(depth), &options).unwrap();
        assert_eq!(chain_depth(ast_to_value(&root)), depth);
    }

    #[test]
    fn test_deep_input_is_rejected_by_default() {
        let err = convert_xml(&"<a>".repeat(100_000), &ParseOptions::new()).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit, .. } if limit == DEFAULT_MAX_DEPTH));

        let at_limit = "<a>".repeat(DEFAULT_MAX_DEPTH);
        let value = convert_xml(&at_limit, &ParseOptions::new()).unwrap();
        assert_eq!(chain_depth(value), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_errors_propagate() {
        let err = convert_xml("<a><1b/></a>", &ParseOptions::new()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid tag name: \"1b\"");
    }
}
