use super::Stmt;

/// A parsed source file: its top-level statements in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn new(body: Vec<Stmt>) -> Self {
        Module { body }
    }
}
