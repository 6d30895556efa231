use rustc_hash::FxHashMap;

use crate::{
    interpreter::{RuntimeError, Value},
    token::Token,
};

/// A lexical scope's bindings plus its enclosing scope.
///
/// Scopes form an owned chain: the interpreter holds the innermost scope
/// and each scope uniquely owns the one enclosing it. Entering a block
/// pushes a fresh scope onto the chain, leaving pops it again.
pub struct Environment {
    enclosing: Option<Box<Environment>>,
    values: FxHashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            enclosing: None,
            values: FxHashMap::default(),
        }
    }

    pub fn set_enclosing(&mut self, enclosing: Box<Environment>) {
        self.enclosing = Some(enclosing)
    }

    /// Detaches and returns the enclosing scope. Only called on block exit,
    /// where an enclosing scope is guaranteed to have been set on entry.
    pub fn take_enclosing(&mut self) -> Box<Environment> {
        match self.enclosing.take() {
            Some(enclosing) => enclosing,
            None => Box::new(Environment::new()),
        }
    }

    /// Creates or silently replaces a binding in this scope only.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Mutates an existing binding, walking outwards through enclosing
    /// scopes. Never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            Ok(())
        } else {
            match &mut self.enclosing {
                Some(enclosing) => enclosing.assign(name, value),
                None => Err(undefined_variable(name)),
            }
        }
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        match self.values.get(&name.lexeme) {
            Some(value) => Ok(value.clone()),
            None => match &self.enclosing {
                Some(enclosing) => enclosing.get(name),
                None => Err(undefined_variable(name)),
            },
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

fn undefined_variable(name: &Token) -> RuntimeError {
    RuntimeError {
        message: format!("Undefined variable '{}'.", name.lexeme),
        token: name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::token::TokenType;

    fn name(lexeme: &str) -> Token {
        Token {
            token_type: TokenType::Identifier,
            lexeme: lexeme.to_string(),
            literal: None,
            line: 1,
        }
    }

    #[test]
    fn define_then_get() {
        let mut environment = Environment::new();
        environment.define("x", Value::Number(1.0));
        assert_eq!(environment.get(&name("x")), Ok(Value::Number(1.0)));
    }

    #[test]
    fn redefining_silently_replaces() {
        let mut environment = Environment::new();
        environment.define("x", Value::Number(1.0));
        environment.define("x", Value::Bool(true));
        assert_eq!(environment.get(&name("x")), Ok(Value::Bool(true)));
    }

    #[test]
    fn get_walks_the_enclosing_chain() {
        let mut outer = Box::new(Environment::new());
        outer.define("x", Value::Number(1.0));

        let mut inner = Environment::new();
        inner.set_enclosing(outer);

        assert_eq!(inner.get(&name("x")), Ok(Value::Number(1.0)));
    }

    #[test]
    fn shadowing_does_not_touch_the_outer_binding() {
        let mut outer = Box::new(Environment::new());
        outer.define("x", Value::Number(1.0));

        let mut inner = Environment::new();
        inner.set_enclosing(outer);
        inner.define("x", Value::Number(2.0));

        assert_eq!(inner.get(&name("x")), Ok(Value::Number(2.0)));

        let outer = inner.take_enclosing();
        assert_eq!(outer.get(&name("x")), Ok(Value::Number(1.0)));
    }

    #[test]
    fn assign_mutates_the_outer_binding_through_the_chain() {
        let mut outer = Box::new(Environment::new());
        outer.define("x", Value::Number(1.0));

        let mut inner = Environment::new();
        inner.set_enclosing(outer);

        inner.assign(&name("x"), Value::Number(5.0)).unwrap();

        let outer = inner.take_enclosing();
        assert_eq!(outer.get(&name("x")), Ok(Value::Number(5.0)));
    }

    #[test]
    fn assign_never_creates_a_binding() {
        let mut environment = Environment::new();
        let error = environment
            .assign(&name("missing"), Value::Nil)
            .unwrap_err();
        assert_eq!(error.message, "Undefined variable 'missing'.");
        assert!(environment.get(&name("missing")).is_err());
    }

    #[test]
    fn get_of_undefined_variable_names_the_variable() {
        let environment = Environment::new();
        let error = environment.get(&name("y")).unwrap_err();
        assert_eq!(error.message, "Undefined variable 'y'.");
        assert_eq!(error.token.line, 1);
    }
}
