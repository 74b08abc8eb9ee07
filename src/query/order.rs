use super::{
    equivalence::Expected,
    node::{QueryError, QueryNode},
};

impl QueryNode {
    /// True when each of `statements` appears in this block, in the given
    /// order. Other statements may sit in between.
    ///
    /// Each statement is located at its first match, and those positions
    /// have to increase strictly. Fewer than two statements never count as
    /// ordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use py_query::QueryNode;
    ///
    /// let code = QueryNode::parse("x = 1\ny = 2\nprint(x + y)\n").unwrap();
    /// assert!(code.is_ordered(&["x = 1", "print(x + y)"]).unwrap());
    /// assert!(!code.is_ordered(&["print(x + y)", "y = 2"]).unwrap());
    /// ```
    pub fn is_ordered(&self, statements: &[&str]) -> Result<bool, QueryError> {
        let expected = statements
            .iter()
            .map(|statement| Expected::program(statement))
            .collect::<Result<Vec<_>, _>>()?;
        if expected.len() < 2 {
            return Ok(false);
        }

        let mut previous = None;
        for pattern in &expected {
            let Some(position) = self.position_of(pattern)? else {
                return Ok(false);
            };
            if previous.is_some_and(|previous| position <= previous) {
                return Ok(false);
            }
            previous = Some(position);
        }
        Ok(true)
    }

    /// True when some statement of this block is equivalent to `statement`.
    pub fn has_stmt(&self, statement: &str) -> Result<bool, QueryError> {
        let expected = Expected::program(statement)?;
        Ok(self.position_of(&expected)?.is_some())
    }

    fn position_of(&self, expected: &Expected) -> Result<Option<usize>, QueryError> {
        for (position, stmt) in self.body().iter().enumerate() {
            if expected.matches_stmt(stmt)? {
                return Ok(Some(position));
            }
        }
        Ok(None)
    }
}
