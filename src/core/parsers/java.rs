//! Java source parser.
//!
//! Parses with tree-sitter-java and lowers the concrete syntax tree into the
//! owned [`crate::core::ast`] model. Literal text is decoded here (escape
//! sequences, text blocks, integer radix and width), so the evaluator only
//! ever sees typed values.

use tree_sitter::{Node as TsNode, Parser};

use crate::core::{
    ast::{
        Annotation, AnnotationElement, AnnotationValue, BinaryOp, CastType, CompilationUnit, Expr,
        ExprNode, IntLiteral, Literal, MethodCall, Node, UnaryOp,
    },
    error::ExtractError,
};

/// Parse a Java source string into a [`CompilationUnit`].
///
/// `path` is stored as-is in the unit; it should already be project-relative.
/// Any syntax error in the file makes the whole file fail.
pub fn parse_java_source(code: &str, path: &str) -> Result<CompilationUnit, ExtractError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_java::LANGUAGE.into())?;
    let tree = parser
        .parse(code, None)
        .ok_or_else(|| ExtractError::ParseFailed {
            path: path.to_string(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(ExtractError::Syntax {
            path: path.to_string(),
            line: first_error_line(root).unwrap_or(1),
        });
    }

    let lowering = Lowering {
        source: code.as_bytes(),
    };
    let mut unit = CompilationUnit {
        path: path.to_string(),
        package: None,
        imports: Vec::new(),
        nodes: Vec::new(),
    };

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_declaration" => unit.package = lowering.package_name(child),
            "import_declaration" => {
                if let Some(import) = lowering.single_type_import(child) {
                    unit.imports.push(import);
                }
            }
            _ => {
                if let Some(node) = lowering.node(child) {
                    unit.nodes.push(node);
                }
            }
        }
    }

    Ok(unit)
}

fn first_error_line(node: TsNode<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(line_of(node));
    }
    let mut cursor = node.walk();
    let children: Vec<TsNode<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error_line)
}

fn line_of(node: TsNode<'_>) -> usize {
    node.start_position().row + 1
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "line_comment" | "block_comment")
}

fn is_expression(kind: &str) -> bool {
    matches!(
        kind,
        "binary_expression"
            | "unary_expression"
            | "ternary_expression"
            | "parenthesized_expression"
            | "cast_expression"
            | "method_invocation"
            | "field_access"
            | "identifier"
            | "string_literal"
            | "character_literal"
            | "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal"
            | "true"
            | "false"
            | "null_literal"
            | "object_creation_expression"
            | "lambda_expression"
            | "array_access"
            | "array_creation_expression"
            | "array_initializer"
            | "assignment_expression"
            | "update_expression"
            | "instanceof_expression"
            | "method_reference"
            | "class_literal"
            | "switch_expression"
            | "this"
            | "super"
    )
}

struct Lowering<'s> {
    source: &'s [u8],
}

impl Lowering<'_> {
    fn text(&self, node: TsNode<'_>) -> &str {
        node.utf8_text(self.source).unwrap_or_default()
    }

    /// Node text with whitespace removed, for dotted names split over lines.
    fn compact_text(&self, node: TsNode<'_>) -> String {
        self.text(node)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    fn package_name(&self, node: TsNode<'_>) -> Option<String> {
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))?;
        Some(self.compact_text(name))
    }

    /// `import a.b.C;` yields `a.b.C`; static and on-demand imports yield nothing.
    fn single_type_import(&self, node: TsNode<'_>) -> Option<String> {
        let mut cursor = node.walk();
        let is_static = node.children(&mut cursor).any(|c| c.kind() == "static");
        if is_static {
            return None;
        }
        let text: String = self
            .text(node)
            .trim()
            .trim_start_matches("import")
            .trim_end_matches(';')
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if text.ends_with('*') || text.is_empty() {
            return None;
        }
        Some(text)
    }

    fn node(&self, node: TsNode<'_>) -> Option<Node> {
        let kind = node.kind();
        if is_comment(kind) {
            return None;
        }
        if matches!(kind, "annotation" | "marker_annotation") {
            return Some(Node::Annotation(self.annotation(node)));
        }
        if is_expression(kind) {
            return Some(Node::Expr(self.expr(node)));
        }
        Some(Node::Group {
            kind: kind.to_string(),
            line: line_of(node),
            children: self.children(node),
        })
    }

    fn children(&self, node: TsNode<'_>) -> Vec<Node> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter_map(|child| self.node(child))
            .collect()
    }

    fn expr(&self, node: TsNode<'_>) -> Expr {
        let line = line_of(node);
        let lowered = match node.kind() {
            "parenthesized_expression" => {
                if let Some(inner) = self.first_named(node) {
                    return self.expr(inner);
                }
                self.other(node)
            }
            "string_literal" => {
                ExprNode::Literal(Literal::Text(decode_string_literal(self.text(node))))
            }
            "character_literal" => match decode_char_literal(self.text(node)) {
                Some(c) => ExprNode::Literal(Literal::Char(c)),
                None => self.other(node),
            },
            "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal"
            | "binary_integer_literal" => match parse_int_literal(self.text(node)) {
                Some(value) => ExprNode::Literal(Literal::Int(value)),
                None => self.other(node),
            },
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                ExprNode::Literal(Literal::Float(parse_float_literal(self.text(node))))
            }
            "true" => ExprNode::Literal(Literal::Bool(true)),
            "false" => ExprNode::Literal(Literal::Bool(false)),
            "null_literal" => ExprNode::Literal(Literal::Null),
            "identifier" => ExprNode::Name(self.text(node).to_string()),
            "binary_expression" => self.binary(node).unwrap_or_else(|| self.other(node)),
            "unary_expression" => self.unary(node).unwrap_or_else(|| self.other(node)),
            "ternary_expression" => self.conditional(node).unwrap_or_else(|| self.other(node)),
            "cast_expression" => self.cast(node).unwrap_or_else(|| self.other(node)),
            "field_access" => self.field_access(node).unwrap_or_else(|| self.other(node)),
            "method_invocation" => self.method_call(node).unwrap_or_else(|| self.other(node)),
            _ => self.other(node),
        };
        Expr::new(lowered, line)
    }

    fn other(&self, node: TsNode<'_>) -> ExprNode {
        ExprNode::Other {
            kind: node.kind().to_string(),
            children: self.children(node),
        }
    }

    fn first_named<'t>(&self, node: TsNode<'t>) -> Option<TsNode<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .find(|c| !is_comment(c.kind()))
    }

    fn field_expr(&self, node: TsNode<'_>, field: &str) -> Option<Box<Expr>> {
        node.child_by_field_name(field)
            .map(|n| Box::new(self.expr(n)))
    }

    fn binary(&self, node: TsNode<'_>) -> Option<ExprNode> {
        let op = BinaryOp::from_token(node.child_by_field_name("operator")?.kind())?;
        Some(ExprNode::Binary {
            op,
            lhs: self.field_expr(node, "left")?,
            rhs: self.field_expr(node, "right")?,
        })
    }

    fn unary(&self, node: TsNode<'_>) -> Option<ExprNode> {
        let op = UnaryOp::from_token(node.child_by_field_name("operator")?.kind())?;
        Some(ExprNode::Unary {
            op,
            operand: self.field_expr(node, "operand")?,
        })
    }

    fn conditional(&self, node: TsNode<'_>) -> Option<ExprNode> {
        Some(ExprNode::Conditional {
            condition: self.field_expr(node, "condition")?,
            then_branch: self.field_expr(node, "consequence")?,
            else_branch: self.field_expr(node, "alternative")?,
        })
    }

    fn cast(&self, node: TsNode<'_>) -> Option<ExprNode> {
        let target = node.child_by_field_name("type")?;
        let target_text = self.text(target).trim();
        let target = match target_text {
            "byte" => CastType::Byte,
            "short" => CastType::Short,
            "char" => CastType::Char,
            "int" => CastType::Int,
            "long" => CastType::Long,
            "String" | "java.lang.String" => CastType::String,
            other => CastType::Other(other.to_string()),
        };
        Some(ExprNode::Cast {
            target,
            operand: self.field_expr(node, "value")?,
        })
    }

    fn field_access(&self, node: TsNode<'_>) -> Option<ExprNode> {
        Some(ExprNode::FieldAccess {
            target: self.field_expr(node, "object")?,
            field: self.text(node.child_by_field_name("field")?).to_string(),
        })
    }

    fn method_call(&self, node: TsNode<'_>) -> Option<ExprNode> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let arguments = match node.child_by_field_name("arguments") {
            Some(list) => {
                let mut cursor = list.walk();
                list.named_children(&mut cursor)
                    .filter(|c| !is_comment(c.kind()))
                    .map(|c| self.expr(c))
                    .collect()
            }
            None => Vec::new(),
        };
        Some(ExprNode::MethodCall(MethodCall {
            name,
            receiver: self.field_expr(node, "object"),
            arguments,
        }))
    }

    fn annotation(&self, node: TsNode<'_>) -> Annotation {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.compact_text(n))
            .unwrap_or_default();
        let mut elements = Vec::new();
        if let Some(arguments) = node.child_by_field_name("arguments") {
            let mut cursor = arguments.walk();
            for argument in arguments.named_children(&mut cursor) {
                if is_comment(argument.kind()) {
                    continue;
                }
                if argument.kind() == "element_value_pair" {
                    let (Some(key), Some(value)) = (
                        argument.child_by_field_name("key"),
                        argument.child_by_field_name("value"),
                    ) else {
                        continue;
                    };
                    elements.push(AnnotationElement {
                        name: self.text(key).to_string(),
                        value: self.element_value(value),
                    });
                } else {
                    elements.push(AnnotationElement {
                        name: crate::core::rules::DEFAULT_ANNOTATION_FIELD.to_string(),
                        value: self.element_value(argument),
                    });
                }
            }
        }
        Annotation {
            name,
            elements,
            line: line_of(node),
        }
    }

    fn element_value(&self, node: TsNode<'_>) -> AnnotationValue {
        match node.kind() {
            "element_value_array_initializer" => {
                let mut cursor = node.walk();
                AnnotationValue::Array(
                    node.named_children(&mut cursor)
                        .filter(|c| !is_comment(c.kind()))
                        .map(|c| self.element_value(c))
                        .collect(),
                )
            }
            "annotation" | "marker_annotation" => {
                AnnotationValue::Annotation(self.annotation(node))
            }
            _ => AnnotationValue::Expr(self.expr(node)),
        }
    }
}

/// Decode a string literal or text block (quotes included) into its value.
pub fn decode_string_literal(raw: &str) -> String {
    let body = if let Some(block) = raw.strip_prefix("\"\"\"") {
        let block = block.strip_suffix("\"\"\"").unwrap_or(block);
        strip_text_block_indent(block)
    } else {
        let body = raw.strip_prefix('"').unwrap_or(raw);
        body.strip_suffix('"').unwrap_or(body).to_string()
    };
    String::from_utf16_lossy(&unescape(&body))
}

/// Decode a character literal (quotes included) into a UTF-16 code unit.
pub fn decode_char_literal(raw: &str) -> Option<u16> {
    let body = raw.strip_prefix('\'')?.strip_suffix('\'')?;
    let units = unescape(body);
    match units.as_slice() {
        [unit] => Some(*unit),
        _ => None,
    }
}

/// Remove the incidental indentation of a text block body (the text after the
/// opening delimiter, up to the closing one).
fn strip_text_block_indent(block: &str) -> String {
    // Content starts after the line terminator following the opening delimiter.
    let content = match block.find('\n') {
        Some(i) => &block[i + 1..],
        None => block,
    };
    let lines: Vec<&str> = content
        .split('\n')
        .map(|l| l.trim_end_matches('\r'))
        .collect();
    let closing_on_own_line = lines.last().is_some_and(|l| l.trim().is_empty());

    let indent = lines
        .iter()
        .enumerate()
        .filter(|(i, l)| !l.trim().is_empty() || (closing_on_own_line && *i == lines.len() - 1))
        .map(|(_, l)| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = lines.iter().map(|l| strip_indent(l, indent)).collect();
    if closing_on_own_line {
        // The closing delimiter line contributes only the final line terminator.
        out.pop();
        let mut joined = out.join("\n");
        joined.push('\n');
        joined
    } else {
        out.join("\n")
    }
}

fn strip_indent(line: &str, indent: usize) -> String {
    let rest: String = line.chars().skip(indent).collect();
    rest.trim_end().to_string()
}

/// Process Java escape sequences into UTF-16 code units.
fn unescape(body: &str) -> Vec<u16> {
    let mut units = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        match chars.next() {
            Some('n') => units.push(u16::from(b'\n')),
            Some('t') => units.push(u16::from(b'\t')),
            Some('r') => units.push(u16::from(b'\r')),
            Some('b') => units.push(0x08),
            Some('f') => units.push(0x0C),
            Some('s') => units.push(u16::from(b' ')),
            Some('"') => units.push(u16::from(b'"')),
            Some('\'') => units.push(u16::from(b'\'')),
            Some('\\') => units.push(u16::from(b'\\')),
            // Line continuation inside text blocks.
            Some('\n') => {}
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                match u16::from_str_radix(&hex, 16) {
                    Ok(unit) => units.push(unit),
                    Err(_) => {
                        units.push(u16::from(b'\\'));
                        units.extend(format!("u{}", hex).encode_utf16());
                    }
                }
            }
            Some(d @ '0'..='7') => {
                // Up to three octal digits, max \377.
                let mut value = d.to_digit(8).unwrap_or(0);
                let max_digits = if d <= '3' { 3 } else { 2 };
                for _ in 1..max_digits {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                units.push(value as u16);
            }
            Some(other) => {
                units.push(u16::from(b'\\'));
                let mut buf = [0u16; 2];
                units.extend_from_slice(other.encode_utf16(&mut buf));
            }
            None => units.push(u16::from(b'\\')),
        }
    }
    units
}

/// Parse an integer literal with Java radix and width rules.
///
/// Non-decimal `int` literals may use all 32 bits (`0xFFFFFFFF` is `-1`).
/// The decimal `2147483648` wraps to `i32::MIN`, which negation then leaves
/// unchanged. It is also accepted without a unary minus, which javac rejects.
pub fn parse_int_literal(raw: &str) -> Option<IntLiteral> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let (digits, long) = match cleaned.strip_suffix(['l', 'L']) {
        Some(digits) => (digits, true),
        None => (cleaned.as_str(), false),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, digits) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex.to_string())
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin.to_string())
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, lower[1..].to_string())
    } else {
        (10, lower)
    };
    let value = u64::from_str_radix(&digits, radix).ok()?;

    if long {
        if radix == 10 && value > i64::MAX as u64 + 1 {
            return None;
        }
        Some(IntLiteral::Long(value as i64))
    } else {
        let limit = if radix == 10 { i32::MAX as u64 + 1 } else { u64::from(u32::MAX) };
        if value > limit {
            return None;
        }
        Some(IntLiteral::Int(value as u32 as i32))
    }
}

fn parse_float_literal(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .trim_end_matches(['f', 'F', 'd', 'D'])
        .to_string();
    cleaned.parse().unwrap_or(f64::NAN)
}
