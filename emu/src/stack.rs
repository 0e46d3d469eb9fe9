use crate::error::Fault;

/// Bounded LIFO of machine values.
#[derive(Debug, Clone)]
pub struct Stack {
    name: &'static str,
    values: Vec<i64>,
    capacity: usize,
}

impl Stack {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Stack {
            name,
            values: Vec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, value: i64) -> Result<(), Fault> {
        if self.values.len() >= self.capacity {
            return Err(Fault::StackOverflow(self.name, self.capacity));
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<i64, Fault> {
        self.values.pop().ok_or(Fault::StackUnderflow(self.name))
    }

    pub fn peek(&self) -> Option<i64> {
        self.values.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, i64> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo() {
        let mut stack = Stack::new("operand", 4);
        assert!(stack.is_empty());
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.peek(), Some(2));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(stack.iter().rev().copied().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(stack.pop().unwrap(), 2);
        assert_eq!(stack.pop().unwrap(), 1);
        assert!(matches!(stack.pop(), Err(Fault::StackUnderflow("operand"))));
    }

    #[test]
    fn overflow() {
        let mut stack = Stack::new("call", 2);
        stack.push(0).unwrap();
        stack.push(0).unwrap();
        assert!(matches!(stack.push(0), Err(Fault::StackOverflow("call", 2))));
        assert_eq!(stack.len(), 2);
    }
}
