//! Owned syntax tree consumed by the evaluator and the scanner.
//!
//! The tree is intentionally coarse: only the expression shapes the constant
//! evaluator understands are modeled precisely. Everything else is kept as a
//! [`Node::Group`] (or [`ExprNode::Other`] inside expressions) so the scanner can
//! still reach translatable calls nested anywhere in a file.
//!
//! Every node carries the 1-based source line it starts on.

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    /// Declared package, e.g. `org.example.app`.
    pub package: Option<String>,
    /// Single-type imports, fully qualified (`org.example.I18n`).
    pub imports: Vec<String>,
    /// Top-level nodes in source order.
    pub nodes: Vec<Node>,
}

impl CompilationUnit {
    /// Resolve an annotation name as written in source to a qualified name.
    ///
    /// Dotted names are taken as written. A simple name matching a single-type
    /// import takes that import; otherwise it is qualified with the package.
    pub fn qualify(&self, name: &str) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        let suffix = format!(".{}", name);
        if let Some(import) = self.imports.iter().find(|i| i.ends_with(&suffix)) {
            return import.clone();
        }
        match &self.package {
            Some(package) => format!("{}.{}", package, name),
            None => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expr(Expr),
    Annotation(Annotation),
    /// Any other syntax (class body, statement, declaration, ...).
    Group {
        kind: String,
        line: usize,
        children: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub node: ExprNode,
    pub line: usize,
}

impl Expr {
    pub fn new(node: ExprNode, line: usize) -> Self {
        Self { node, line }
    }

    pub fn kind(&self) -> ExprKind {
        match &self.node {
            ExprNode::Literal(_) => ExprKind::Literal,
            ExprNode::Binary { .. } => ExprKind::Binary,
            ExprNode::Unary { .. } => ExprKind::Unary,
            ExprNode::Conditional { .. } => ExprKind::Conditional,
            ExprNode::Cast { .. } => ExprKind::Cast,
            ExprNode::Name(_) => ExprKind::Name,
            ExprNode::FieldAccess { .. } => ExprKind::FieldAccess,
            ExprNode::MethodCall(_) => ExprKind::MethodCall,
            ExprNode::Other { .. } => ExprKind::Other,
        }
    }
}

/// Discriminant of [`ExprNode`], used as the evaluator's dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal,
    Binary,
    Unary,
    Conditional,
    Cast,
    Name,
    FieldAccess,
    MethodCall,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Literal(Literal),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Cast {
        target: CastType,
        operand: Box<Expr>,
    },
    /// Bare identifier: `variable`, `CONSTANT`.
    Name(String),
    FieldAccess {
        target: Box<Expr>,
        field: String,
    },
    MethodCall(MethodCall),
    /// Expression kinds the evaluator does not model (lambdas, object creation,
    /// array access, ...). Children are kept so nested calls stay reachable.
    Other { kind: String, children: Vec<Node> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// Simple method name (`tr` in `i18n.tr("x")`).
    pub name: String,
    pub receiver: Option<Box<Expr>>,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    /// UTF-16 code unit, as Java `char`.
    Char(u16),
    Bool(bool),
    /// Integer literal already typed by width (`1` is 32-bit, `1L` is 64-bit).
    Int(IntLiteral),
    Float(f64),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntLiteral {
    Int(i32),
    Long(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            ">>>" => BinaryOp::UShr,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        })
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    BitNot,
    Not,
}

impl UnaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "-" => UnaryOp::Neg,
            "+" => UnaryOp::Plus,
            "~" => UnaryOp::BitNot,
            "!" => UnaryOp::Not,
            _ => return None,
        })
    }
}

/// Cast target types the evaluator can act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastType {
    Byte,
    Short,
    Char,
    Int,
    Long,
    String,
    /// Anything else (`float`, `Object`, generics, ...).
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Name as written in source (`Tr` or `org.example.Tr`).
    pub name: String,
    pub elements: Vec<AnnotationElement>,
    pub line: usize,
}

impl Annotation {
    pub fn element(&self, name: &str) -> Option<&AnnotationValue> {
        self.elements
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }
}

/// `name = value` pair; a single unnamed argument is stored as `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationElement {
    pub name: String,
    pub value: AnnotationValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Expr(Expr),
    Array(Vec<AnnotationValue>),
    Annotation(Annotation),
}
