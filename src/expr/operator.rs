use strum::{Display, EnumString};

/// Binary operators usable in expressions.
///
/// Displays as the symbol used by `explain` and parses back from it:
///
/// ```
/// use skiff::Operator;
///
/// assert_eq!(Operator::NotEqual.to_string(), "!=");
/// assert_eq!("and".parse::<Operator>().unwrap(), Operator::And);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Operator {
    #[strum(to_string = "=", serialize = "==")]
    Equal,
    #[strum(to_string = "!=", serialize = "<>")]
    NotEqual,
    #[strum(to_string = ">")]
    GreaterThan,
    #[strum(to_string = ">=")]
    GreaterThanEqual,
    #[strum(to_string = "<")]
    LessThan,
    #[strum(to_string = "<=")]
    LessThanEqual,

    /// Null operands count as false.
    #[strum(to_string = "AND", serialize = "&")]
    And,
    #[strum(to_string = "OR", serialize = "|")]
    Or,

    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Subtract,
    #[strum(to_string = "*")]
    Multiply,
    /// Fails with a division by zero error rather than producing infinity.
    #[strum(to_string = "/")]
    Divide,
}

impl Operator {
    /// Comparisons yield a boolean and accept integer/float operands mixed.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::GreaterThan
                | Operator::GreaterThanEqual
                | Operator::LessThan
                | Operator::LessThanEqual
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }
}
