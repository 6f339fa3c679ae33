//! # Parser Combinators
//!
//! Small parsers and the combinators that compose them.
//!
//! * **Basic**: `Equal`, `Satisfy`
//! * **Sequential**: `Tuple2`, `Preceded`, `Delimited`
//! * **Alternative**: `Choice`
//! * **Repetition**: `Many`, `SeparatedList`
//! * **Transformation**: `Map`, `AsUnit`
//! * **Context and recursion**: `WithContext`, `Lazy`

use super::core::ParseError;
use super::core::ParseResult;
use super::core::Parser;
use std::fmt;
use std::marker::PhantomData;

/// Equal: Matches a specific value in the input
///
/// Consumes one token on success.
#[derive(Clone)]
pub struct Equal<I> {
    value: I,
}

impl<I> Equal<I> {
    pub fn new(value: I) -> Self {
        Self { value }
    }
}

impl<I: Clone + PartialEq + fmt::Display> Parser<I, I> for Equal<I> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<I> {
        match input.get(pos) {
            Some(found) if *found == self.value => Ok((pos + 1, found.clone())),
            Some(found) => Err(ParseError::Unexpected {
                expected: self.value.to_string(),
                found: found.to_string(),
                position: pos,
            }),
            None => Err(ParseError::UnexpectedEOF { position: pos }),
        }
    }
}

/// Satisfy: Consumes one token when the function maps it to a value
#[derive(Clone)]
pub struct Satisfy<I, O, F> {
    f: F,
    _phantom: PhantomData<(I, O)>,
}

impl<I, O, F> Satisfy<I, O, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, F> Parser<I, O> for Satisfy<I, O, F>
where
    I: fmt::Display,
    F: Fn(&I) -> Option<O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let found = input
            .get(pos)
            .ok_or(ParseError::UnexpectedEOF { position: pos })?;
        (self.f)(found)
            .map(|result| (pos + 1, result))
            .ok_or_else(|| ParseError::Failure {
                message: format!("unexpected {}", found),
                position: pos,
            })
    }
}

/// Choice: Tries multiple parsers and succeeds with the first successful one
///
/// When every alternative fails, the error that got furthest into the input
/// is reported. If all of them failed at the same token the result is
/// `NoAlternative`.
pub struct Choice<I, O> {
    parsers: Vec<Box<dyn Parser<I, O>>>,
}

impl<I, O> Choice<I, O> {
    pub fn new(parsers: Vec<Box<dyn Parser<I, O>>>) -> Self {
        Self { parsers }
    }
}

impl<I, O> Parser<I, O> for Choice<I, O> {
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let mut furthest: Option<ParseError> = None;
        for parser in &self.parsers {
            match parser.parse(input, pos) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if furthest
                        .as_ref()
                        .is_none_or(|best| e.position() > best.position())
                    {
                        furthest = Some(e);
                    }
                }
            }
        }
        match furthest {
            Some(e) if e.position() > pos => Err(e),
            Some(e) if matches!(e.root(), ParseError::UnexpectedEOF { .. }) => {
                Err(ParseError::UnexpectedEOF { position: pos })
            }
            _ => Err(ParseError::NoAlternative { position: pos }),
        }
    }
}

/// Preceded: Runs two parsers and keeps the second result
#[derive(Clone)]
pub struct Preceded<P1, P2, I, O1> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1)>,
}

impl<P1, P2, I, O1> Preceded<P1, P2, I, O1> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, O2> for Preceded<P1, P2, I, O1>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O2> {
        let (pos, _) = self.parser1.parse(input, pos)?;
        self.parser2.parse(input, pos)
    }
}

/// Map: Transforms the output of a parser
#[derive(Clone)]
pub struct Map<P, F, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(A, B)>,
}

impl<P, F, A, B> Map<P, F, A, B> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for Map<P, F, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<B> {
        self.parser
            .parse(input, pos)
            .map(|(pos, value)| (pos, (self.f)(value)))
    }
}

#[derive(Clone)]
pub struct AsUnit<P, O> {
    parser: P,
    _phantom: PhantomData<O>,
}

impl<P, O> AsUnit<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, P, O> Parser<I, ()> for AsUnit<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<()> {
        self.parser.parse(input, pos).map(|(pos, _)| (pos, ()))
    }
}

/// Many: Applies a parser zero or more times
///
/// Collection stops at the first element that fails without consuming
/// anything. An element that fails after consuming input (an operator with
/// a broken operand, say) aborts the whole repetition with that error.
#[derive(Clone)]
pub struct Many<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Many<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Vec<O>> for Many<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let mut current_pos = pos;

        loop {
            match self.parser.parse(input, current_pos) {
                Ok((new_pos, value)) => {
                    results.push(value);
                    current_pos = new_pos;
                }
                Err(e) if e.position() > current_pos => return Err(e),
                Err(e) => {
                    tracing::trace!(
                        target: "parser::many",
                        error = ?e,
                        position = current_pos,
                        items_collected = results.len(),
                        "Many parser stopped collection"
                    );
                    break;
                }
            }
        }

        Ok((current_pos, results))
    }
}

/// SeparatedList: Parses a list of items separated by a delimiter
///
/// Handles empty lists, single items and a trailing separator.
pub struct SeparatedList<P, S, I, O> {
    item_parser: P,
    separator_parser: S,
    _phantom: PhantomData<(I, O)>,
}

impl<P, S, I, O> SeparatedList<P, S, I, O> {
    pub fn new(item_parser: P, separator_parser: S) -> Self {
        Self {
            item_parser,
            separator_parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P, S> Parser<I, Vec<O>> for SeparatedList<P, S, I, O>
where
    P: Parser<I, O>,
    S: Parser<I, ()>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let mut current_pos = pos;

        if let Ok((new_pos, value)) = self.item_parser.parse(input, current_pos) {
            results.push(value);
            current_pos = new_pos;

            while let Ok((sep_pos, _)) = self.separator_parser.parse(input, current_pos) {
                current_pos = sep_pos;
                match self.item_parser.parse(input, current_pos) {
                    Ok((new_pos, value)) => {
                        results.push(value);
                        current_pos = new_pos;
                    }
                    Err(e) if e.position() > current_pos => return Err(e),
                    Err(_) => break,
                }
            }
        }

        Ok((current_pos, results))
    }
}

#[derive(Clone)]
pub struct Tuple2<P1, P2, I, O1, O2> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1, O2)>,
}

impl<P1, P2, I, O1, O2> Tuple2<P1, P2, I, O1, O2> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, (O1, O2)> for Tuple2<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<(O1, O2)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        Ok((pos, (result1, result2)))
    }
}

/// Delimited: Parses content between a left and a right delimiter
#[derive(Clone)]
pub struct Delimited<L, P, R, I, O> {
    left: L,
    parser: P,
    right: R,
    _phantom: PhantomData<(I, O)>,
}

impl<L, P, R, I, O> Delimited<L, P, R, I, O> {
    pub fn new(left: L, parser: P, right: R) -> Self {
        Self {
            left,
            parser,
            right,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, L, P, R> Parser<I, O> for Delimited<L, P, R, I, O>
where
    L: Parser<I, ()>,
    P: Parser<I, O>,
    R: Parser<I, ()>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        let (pos, _) = self.left.parse(input, pos)?;
        let (pos, value) = self.parser.parse(input, pos)?;
        let (pos, _) = self.right.parse(input, pos)?;
        Ok((pos, value))
    }
}

#[derive(Clone)]
pub struct WithContext<P, C> {
    parser: P,
    context: C,
}

impl<P, C> WithContext<P, C> {
    pub fn new(parser: P, context: C) -> Self {
        Self { parser, context }
    }
}

impl<I, O, P, C: ToString> Parser<I, O> for WithContext<P, C>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        self.parser
            .parse(input, pos)
            .map_err(|e| e.with_context(&self.context.to_string()))
    }
}

/// Lazy: Builds the inner parser on demand, which allows recursive grammars
#[derive(Clone)]
pub struct Lazy<F> {
    f: F,
}

impl<F> Lazy<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<I, O, F, P> Parser<I, O> for Lazy<F>
where
    F: Fn() -> P,
    P: Parser<I, O>,
{
    fn parse(&self, input: &[I], pos: usize) -> ParseResult<O> {
        (self.f)().parse(input, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit(d: i32) -> Satisfy<i32, i32, impl Fn(&i32) -> Option<i32> + Clone> {
        Satisfy::new(move |x: &i32| if *x == d { Some(*x) } else { None })
    }

    #[test]
    fn test_equal() {
        let input = vec![1, 2, 3];
        assert_eq!(Equal::new(1).parse(&input, 0), Ok((1, 1)));
        assert_eq!(
            Equal::new(1).parse(&input, 1),
            Err(ParseError::Unexpected {
                expected: "1".to_string(),
                found: "2".to_string(),
                position: 1
            })
        );
        assert_eq!(
            Equal::new(1).parse(&input, 3),
            Err(ParseError::UnexpectedEOF { position: 3 })
        );
    }

    #[test]
    fn test_satisfy() {
        let input = vec![1, 2, 3, 4, 5];
        let even = Satisfy::new(|x: &i32| if *x % 2 == 0 { Some(*x) } else { None });
        assert_eq!(even.parse(&input, 1), Ok((2, 2)));
        assert!(matches!(
            even.parse(&input, 0),
            Err(ParseError::Failure { position: 0, .. })
        ));
        assert_eq!(
            even.parse(&input, 5),
            Err(ParseError::UnexpectedEOF { position: 5 })
        );
    }

    #[test]
    fn test_choice() {
        let input = vec![1, 2, 3];
        let parser = Choice::new(vec![Box::new(digit(2)), Box::new(digit(1))]);
        assert_eq!(parser.parse(&input, 0), Ok((1, 1)));
        assert_eq!(parser.parse(&input, 1), Ok((2, 2)));
        assert_eq!(
            parser.parse(&input, 2),
            Err(ParseError::NoAlternative { position: 2 })
        );
    }

    #[test]
    fn test_choice_reports_furthest_error() {
        let input = vec![1, 2, 9];
        let pair = Map::new(Tuple2::new(digit(1), Tuple2::new(digit(2), digit(3))), |_| 0);
        let parser = Choice::new(vec![Box::new(pair), Box::new(digit(7))]);
        assert_eq!(parser.parse(&input, 0).unwrap_err().position(), 2);
    }

    #[test]
    fn test_many() {
        let input = vec![1, 1, 1, 2];
        assert_eq!(Many::new(digit(1)).parse(&input, 0), Ok((3, vec![1, 1, 1])));
        assert_eq!(Many::new(digit(2)).parse(&input, 0), Ok((0, vec![])));
    }

    #[test]
    fn test_many_aborts_on_partial_element() {
        // `1 2` pairs, the last pair is broken after its first token
        let input = vec![1, 2, 1, 3];
        let pairs = Many::new(Tuple2::new(digit(1), digit(2)));
        assert_eq!(pairs.parse(&input, 0).unwrap_err().position(), 3);
    }

    #[test]
    fn test_separated_list() {
        let input = vec![1, 0, 1, 0, 1, 5];
        let parser = SeparatedList::new(digit(1), AsUnit::new(digit(0)));
        assert_eq!(parser.parse(&input, 0), Ok((5, vec![1, 1, 1])));

        let empty: Vec<i32> = vec![5];
        assert_eq!(parser.parse(&empty, 0), Ok((0, vec![])));
    }

    #[test]
    fn test_delimited_and_preceded() {
        let input = vec![0, 1, 0];
        let parser = Delimited::new(AsUnit::new(digit(0)), digit(1), AsUnit::new(digit(0)));
        assert_eq!(parser.parse(&input, 0), Ok((3, 1)));

        let parser = Preceded::new(digit(0), digit(1));
        assert_eq!(parser.parse(&input, 0), Ok((2, 1)));
    }

    #[test]
    fn test_with_context() {
        let input = vec![1];
        let parser = WithContext::new(digit(2), "two");
        let err = parser.parse(&input, 0).unwrap_err();
        assert!(err.to_string().starts_with("two: "));
    }

    #[test]
    fn test_lazy() {
        let input = vec![1];
        let parser = Lazy::new(|| digit(1));
        assert_eq!(parser.parse(&input, 0), Ok((1, 1)));
    }
}
