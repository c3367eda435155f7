//! Calculation tools: expression evaluation, percentage change, CAGR.

use std::sync::Arc;

use crate::error::MagpieError;
use crate::tools::schema::ToolParameters;
use crate::tools::tool::{ResearchTool, Tool};

/// Evaluate a basic arithmetic expression.
///
/// Supports `+ - * / % ^`, parentheses, unary minus and `sqrt(x)`.
fn evaluate(expression: &str) -> Result<f64, String> {
    let mut parser = Parser {
        chars: expression.chars().collect(),
        pos: 0,
    };
    let value = parser.parse_expr()?;
    parser.skip_ws();
    if parser.pos != parser.chars.len() {
        return Err(format!(
            "unexpected input at position {}",
            parser.pos + 1
        ));
    }
    if !value.is_finite() {
        return Err("result is not a finite number".to_string());
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, String> {
        let mut value = self.parse_term()?;
        loop {
            if self.eat('+') {
                value += self.parse_term()?;
            } else if self.eat('-') {
                value -= self.parse_term()?;
            } else {
                return Ok(value);
            }
        }
    }

    // term := power (('*' | '/' | '%') power)*
    fn parse_term(&mut self) -> Result<f64, String> {
        let mut value = self.parse_power()?;
        loop {
            if self.eat('*') {
                value *= self.parse_power()?;
            } else if self.eat('/') {
                let divisor = self.parse_power()?;
                if divisor == 0.0 {
                    return Err("division by zero".to_string());
                }
                value /= divisor;
            } else if self.eat('%') {
                let divisor = self.parse_power()?;
                if divisor == 0.0 {
                    return Err("division by zero".to_string());
                }
                value %= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    // power := unary ('^' power)?   (right associative)
    fn parse_power(&mut self) -> Result<f64, String> {
        let base = self.parse_unary()?;
        if self.eat('^') {
            let exponent = self.parse_power()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<f64, String> {
        if self.eat('-') {
            return Ok(-self.parse_unary()?);
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<f64, String> {
        self.skip_ws();
        if self.eat('(') {
            let value = self.parse_expr()?;
            if !self.eat(')') {
                return Err("missing closing parenthesis".to_string());
            }
            return Ok(value);
        }

        // sqrt(...)
        if self.chars[self.pos..].starts_with(&['s', 'q', 'r', 't']) {
            self.pos += 4;
            if !self.eat('(') {
                return Err("expected '(' after sqrt".to_string());
            }
            let inner = self.parse_expr()?;
            if !self.eat(')') {
                return Err("missing closing parenthesis".to_string());
            }
            if inner < 0.0 {
                return Err("square root of a negative number".to_string());
            }
            return Ok(inner.sqrt());
        }

        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(match self.peek() {
                Some(c) => format!("unexpected character '{c}'"),
                None => "unexpected end of expression".to_string(),
            });
        }
        let literal: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        literal
            .parse()
            .map_err(|_| format!("invalid number '{literal}'"))
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Create the `calculate` tool.
pub fn calculate_tool() -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "calculate",
        "Evaluate an arithmetic expression. Supports + - * / % ^, parentheses \
         and sqrt().",
        ToolParameters::object()
            .string("expression", "Mathematical expression to evaluate", true)
            .build(),
        |args| async move {
            let expression = args.get_str("expression")?.to_string();
            match evaluate(&expression) {
                Ok(result) => Ok(serde_json::json!({
                    "status": "success",
                    "expression": expression,
                    "result": result,
                    "formatted": format_number(result),
                })),
                Err(message) => Ok(serde_json::json!({
                    "status": "error",
                    "message": format!("Calculation failed: {message}"),
                    "expression": expression,
                })),
            }
        },
    ))
}

/// Create the `percentage_change` tool.
pub fn percentage_change_tool() -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "percentage_change",
        "Calculate the percentage change between two values.",
        ToolParameters::object()
            .number("old_value", "Original value", true)
            .number("new_value", "New value", true)
            .build(),
        |args| async move {
            let old_value = args.get_f64("old_value")?;
            let new_value = args.get_f64("new_value")?;

            if old_value == 0.0 {
                return Ok(serde_json::json!({
                    "status": "error",
                    "message": "Cannot calculate percentage change from zero",
                }));
            }

            let change = (new_value - old_value) / old_value * 100.0;
            let direction = if change >= 0.0 { "increase" } else { "decrease" };

            Ok(serde_json::json!({
                "status": "success",
                "old_value": old_value,
                "new_value": new_value,
                "change_percent": change,
                "direction": direction,
            }))
        },
    ))
}

/// Create the `compound_growth_rate` tool (CAGR).
pub fn compound_growth_rate_tool() -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "compound_growth_rate",
        "Calculate the compound annual growth rate between a start and end value \
         over a number of periods.",
        ToolParameters::object()
            .number("start_value", "Value at the start of the period", true)
            .number("end_value", "Value at the end of the period", true)
            .number("periods", "Number of periods (e.g. years)", true)
            .build(),
        |args| async move {
            let start_value = args.get_f64("start_value")?;
            let end_value = args.get_f64("end_value")?;
            let periods = args.get_f64("periods")?;

            if start_value <= 0.0 || end_value <= 0.0 || periods <= 0.0 {
                return Ok(serde_json::json!({
                    "status": "error",
                    "message": "start_value, end_value and periods must all be positive",
                }));
            }

            let rate = ((end_value / start_value).powf(1.0 / periods) - 1.0) * 100.0;

            Ok(serde_json::json!({
                "status": "success",
                "start_value": start_value,
                "end_value": end_value,
                "periods": periods,
                "cagr_percent": rate,
                "formatted": format!("{rate:.2}% per period"),
            }))
        },
    ))
}
