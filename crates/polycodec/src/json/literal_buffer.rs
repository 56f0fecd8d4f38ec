use super::token::ValueType;

/// What happened after feeding one more character into the literal matcher?
pub(crate) enum Step {
    /// Character matched, but the literal is not finished yet.
    NeedMore,
    /// Character matched and completed the literal.
    Done(&'static str, ValueType),
    /// Character did not match the expected byte.
    Reject,
}

/// Remaining bytes of `null`, `true` or `false` while one is being matched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer(Option<(&'static [u8], &'static str, ValueType)>);

impl ExpectedLiteralBuffer {
    pub fn none() -> Self {
        ExpectedLiteralBuffer(None)
    }

    /// Start matching after the first character (`n`, `t`, or `f`).
    pub fn new(first: char) -> Self {
        match first {
            'n' => ExpectedLiteralBuffer(Some((b"ull", "null", ValueType::Null))),
            't' => ExpectedLiteralBuffer(Some((b"rue", "true", ValueType::Bool))),
            'f' => ExpectedLiteralBuffer(Some((b"alse", "false", ValueType::Bool))),
            _ => ExpectedLiteralBuffer::none(),
        }
    }

    pub fn step(&mut self, c: char) -> Step {
        let Some((bytes, literal, kind)) = self.0.take() else {
            return Step::Reject;
        };

        match bytes.split_first() {
            Some((expected, rest)) if char::from(*expected) == c => {
                if rest.is_empty() {
                    Step::Done(literal, kind)
                } else {
                    self.0 = Some((rest, literal, kind));
                    Step::NeedMore
                }
            }
            _ => {
                self.0 = Some((bytes, literal, kind));
                Step::Reject
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_true() {
        let mut lit = ExpectedLiteralBuffer::new('t');
        assert!(matches!(lit.step('r'), Step::NeedMore));
        assert!(matches!(lit.step('u'), Step::NeedMore));
        assert!(matches!(lit.step('e'), Step::Done("true", ValueType::Bool)));
    }

    #[test]
    fn rejects_mismatch_and_keeps_state() {
        let mut lit = ExpectedLiteralBuffer::new('n');
        assert!(matches!(lit.step('u'), Step::NeedMore));
        assert!(matches!(lit.step('x'), Step::Reject));
        assert!(matches!(lit.step('l'), Step::NeedMore));
    }
}
