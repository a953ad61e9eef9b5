//! Call/annotation scanner.
//!
//! Walks a [`CompilationUnit`] once, matches method calls and annotations
//! against the [`RuleRegistry`], folds their text arguments with the
//! [`Evaluator`] and records every constant result in a [`MessageStore`].
//!
//! Arguments that are not compile-time text (variables, method results,
//! conditionals on runtime values) are skipped silently.

use tracing::debug;

use crate::core::{
    ast::{Annotation, AnnotationValue, CompilationUnit, Expr, ExprNode, MethodCall, Node},
    eval::{EvalError, Evaluator},
    rules::{MethodRule, RuleRegistry},
    store::{MessageStore, Occurrence},
};

/// Scan one compilation unit into a new store.
pub fn scan_unit(
    unit: &CompilationUnit,
    registry: &RuleRegistry,
    evaluator: &Evaluator,
) -> Result<MessageStore, EvalError> {
    let mut scanner = Scanner::new(unit, registry, evaluator);
    scanner.visit_nodes(&unit.nodes)?;
    debug!(
        file = %unit.path,
        messages = scanner.store.len(),
        skipped = scanner.skipped,
        "scanned file"
    );
    Ok(scanner.store)
}

struct Scanner<'a> {
    unit: &'a CompilationUnit,
    registry: &'a RuleRegistry,
    evaluator: &'a Evaluator,
    store: MessageStore,
    /// Matched sites whose text was not constant.
    skipped: usize,
}

impl<'a> Scanner<'a> {
    fn new(
        unit: &'a CompilationUnit,
        registry: &'a RuleRegistry,
        evaluator: &'a Evaluator,
    ) -> Self {
        Self {
            unit,
            registry,
            evaluator,
            store: MessageStore::new(),
            skipped: 0,
        }
    }

    fn occurrence(&self, line: usize) -> Occurrence {
        Occurrence::new(self.unit.path.clone(), line)
    }

    fn visit_nodes(&mut self, nodes: &[Node]) -> Result<(), EvalError> {
        for node in nodes {
            self.visit_node(node)?;
        }
        Ok(())
    }

    fn visit_node(&mut self, node: &Node) -> Result<(), EvalError> {
        match node {
            Node::Expr(expr) => self.visit_expr(expr),
            Node::Annotation(annotation) => self.visit_annotation(annotation),
            Node::Group { children, .. } => self.visit_nodes(children),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), EvalError> {
        match &expr.node {
            ExprNode::MethodCall(call) => {
                if let Some(rule) = self.registry.find_method_rule(&call.name) {
                    self.extract_call(rule, call, expr.line)?;
                }
                if let Some(receiver) = &call.receiver {
                    self.visit_expr(receiver)?;
                }
                for argument in &call.arguments {
                    self.visit_expr(argument)?;
                }
                Ok(())
            }
            ExprNode::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs)?;
                self.visit_expr(rhs)
            }
            ExprNode::Unary { operand, .. } | ExprNode::Cast { operand, .. } => {
                self.visit_expr(operand)
            }
            ExprNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(condition)?;
                self.visit_expr(then_branch)?;
                self.visit_expr(else_branch)
            }
            ExprNode::FieldAccess { target, .. } => self.visit_expr(target),
            ExprNode::Other { children, .. } => self.visit_nodes(children),
            ExprNode::Literal(_) | ExprNode::Name(_) => Ok(()),
        }
    }

    fn extract_call(
        &mut self,
        rule: &MethodRule,
        call: &MethodCall,
        line: usize,
    ) -> Result<(), EvalError> {
        let Some(singular) = call.arguments.get(rule.singular_index) else {
            debug!(
                file = %self.unit.path,
                line,
                method = %call.name,
                "call has no singular argument"
            );
            return Ok(());
        };
        let Some(singular) = self.constant_text(singular)? else {
            return Ok(());
        };

        // An overload without the plural argument still yields the singular message.
        let plural = match rule.plural_index.and_then(|i| call.arguments.get(i)) {
            Some(plural) => match self.constant_text(plural)? {
                Some(plural) => Some(plural),
                None => return Ok(()),
            },
            None => None,
        };

        self.store.record(singular, plural, self.occurrence(line));
        Ok(())
    }

    fn visit_annotation(&mut self, annotation: &Annotation) -> Result<(), EvalError> {
        let qualified = self.unit.qualify(&annotation.name);
        if let Some(rule) = self.registry.find_annotation_rule(&qualified) {
            for field in &rule.fields {
                if let Some(value) = annotation.element(field) {
                    self.extract_annotation_value(value, annotation.line)?;
                }
            }
        }
        for element in &annotation.elements {
            self.visit_annotation_value(&element.value)?;
        }
        Ok(())
    }

    fn extract_annotation_value(
        &mut self,
        value: &AnnotationValue,
        line: usize,
    ) -> Result<(), EvalError> {
        match value {
            AnnotationValue::Expr(expr) => {
                if let Some(text) = self.constant_text(expr)? {
                    self.store.record(text, None, self.occurrence(line));
                }
                Ok(())
            }
            AnnotationValue::Array(items) => {
                for item in items {
                    self.extract_annotation_value(item, line)?;
                }
                Ok(())
            }
            AnnotationValue::Annotation(_) => Ok(()),
        }
    }

    fn visit_annotation_value(&mut self, value: &AnnotationValue) -> Result<(), EvalError> {
        match value {
            AnnotationValue::Expr(expr) => self.visit_expr(expr),
            AnnotationValue::Array(items) => {
                for item in items {
                    self.visit_annotation_value(item)?;
                }
                Ok(())
            }
            AnnotationValue::Annotation(nested) => self.visit_annotation(nested),
        }
    }

    /// Non-empty constant text, or `None` (counted as skipped).
    fn constant_text(&mut self, expr: &Expr) -> Result<Option<String>, EvalError> {
        match self.evaluator.evaluate_text(expr)? {
            Some(text) if !text.is_empty() => Ok(Some(text)),
            _ => {
                debug!(file = %self.unit.path, line = expr.line, "skipping non-constant text");
                self.skipped += 1;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::{
        parsers::java::parse_java_source,
        rules::{AnnotationRule, MethodRule},
    };

    fn scan(code: &str, registry: &RuleRegistry) -> MessageStore {
        let unit = parse_java_source(code, "src/Test.java").unwrap();
        scan_unit(&unit, registry, &Evaluator::new()).unwrap()
    }

    fn tr_registry() -> RuleRegistry {
        RuleRegistry::new(
            [MethodRule::new("t", 0, None), MethodRule::new("trn", 0, Some(1))],
            [],
        )
        .unwrap()
    }

    fn lines(store: &MessageStore, singular: &str) -> Vec<usize> {
        store
            .find(singular, None)
            .map(|m| m.occurrences.iter().map(|o| o.line).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_end_to_end_extraction() {
        let code = r#"
class Greeter {
    void greet(boolean cond, String variable) {
        t("hello");
        t("hello");
        t("a" + "b");
        t(cond ? "x" : "y");
        t(variable);
    }
}
"#;
        let store = scan(code, &tr_registry());

        assert_eq!(store.len(), 2);
        assert_eq!(lines(&store, "hello"), vec![4, 5]);
        assert_eq!(lines(&store, "ab"), vec![6]);
        assert!(store.find("x", None).is_none());
        assert!(store.find("y", None).is_none());
    }

    #[test]
    fn test_matches_by_simple_name_on_any_receiver() {
        let code = r#"
class A {
    void f() {
        i18n.t("one");
        Messages.get().t("two");
        other.tr("ignored");
    }
}
"#;
        let store = scan(code, &tr_registry());
        assert!(store.find("one", None).is_some());
        assert!(store.find("two", None).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_plural_rule() {
        let code = r#"
class A {
    void f(int n, String s) {
        trn("{0} file", "{0} files", n);
        trn("{0} dir", s, n);
        trn("only singular");
    }
}
"#;
        let store = scan(code, &tr_registry());
        assert!(store.find("{0} file", Some("{0} files")).is_some());
        assert!(store.find("{0} dir", None).is_none());
        assert!(store.find("only singular", None).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_nested_calls_are_visited() {
        let code = r#"
class A {
    Runnable r = () -> show(t("in lambda"));
    void f() {
        list.forEach(new Consumer<String>() {
            public void accept(String s) { log(t("in anonymous class")); }
        });
        t(t("inner"));
    }
}
"#;
        let store = scan(code, &tr_registry());
        assert!(store.find("in lambda", None).is_some());
        assert!(store.find("in anonymous class", None).is_some());
        assert!(store.find("inner", None).is_some());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_empty_and_non_text_arguments_are_skipped() {
        let code = r#"
class A {
    void f() {
        t("");
        t(42);
        t();
    }
}
"#;
        assert!(scan(code, &tr_registry()).is_empty());
    }

    #[test]
    fn test_annotation_fields() {
        let code = r#"
package org.app;

import org.i18n.Label;

class A {
    @Label("Name")
    String name;

    @Label(value = "Age", tooltip = "In years", other = "ignored")
    int age;

    @org.i18n.Label(value = {"First", "Second"})
    String[] list;

    @Unrelated("nope")
    String nope;
}
"#;
        let registry = RuleRegistry::new(
            [],
            [AnnotationRule::with_fields("org.i18n.Label", &["value", "tooltip"])],
        )
        .unwrap();

        let store = scan(code, &registry);

        let mut texts: Vec<&str> = store.sorted().iter().map(|m| m.singular()).collect();
        texts.sort();
        assert_eq!(texts, vec!["Age", "First", "In years", "Name", "Second"]);
        assert_eq!(lines(&store, "Name"), vec![7]);
    }

    #[test]
    fn test_annotation_resolved_against_package() {
        let code = r#"
package org.i18n;

@Label("Same package")
class A {}
"#;
        let registry = RuleRegistry::new([], [AnnotationRule::new("org.i18n.Label")]).unwrap();
        assert!(scan(code, &registry).find("Same package", None).is_some());
    }

    #[test]
    fn test_non_constant_annotation_field_is_skipped() {
        let code = r#"
import org.i18n.Label;

class A {
    @Label(value = SOME_CONSTANT, tooltip = "Kept")
    String name;
}
"#;
        let registry = RuleRegistry::new(
            [],
            [AnnotationRule::with_fields("org.i18n.Label", &["value", "tooltip"])],
        )
        .unwrap();
        let store = scan(code, &registry);
        assert_eq!(store.len(), 1);
        assert!(store.find("Kept", None).is_some());
    }

    #[test]
    fn test_constant_condition_and_arithmetic() {
        let code = r#"
class A {
    void f() {
        t(1 < 2 ? "picked" : variable);
        t("count: " + (3 * 4));
        t("x" + 'y' + (char) 122);
    }
}
"#;
        let store = scan(code, &tr_registry());
        assert!(store.find("picked", None).is_some());
        assert!(store.find("count: 12", None).is_some());
        assert!(store.find("xyz", None).is_some());
    }
}
