/*!
  Conversion between the textual form of a memory cell and the numeric word it holds.

  A word is written either in hexadecimal with a `0x` (or `0X`) prefix, or in decimal with an
  optional sign. Surrounding whitespace, including a stray carriage return, is ignored.
*/

use nom::{
  IResult,
  branch::alt,
  bytes::complete::tag_no_case,
  character::complete::{digit1, hex_digit1, multispace0, one_of},
  combinator::{all_consuming, map_res, opt, recognize},
  sequence::{delimited, pair, preceded},
};

use super::{DataWord, Word};

fn hexadecimal(input: &str) -> IResult<&str, i64> {
  map_res(
    preceded(tag_no_case("0x"), hex_digit1),
    |digits: &str| i64::from_str_radix(digits, 16)
  )(input)
}

fn decimal(input: &str) -> IResult<&str, i64> {
  map_res(
    recognize(pair(opt(one_of("+-")), digit1)),
    |digits: &str| digits.parse::<i64>()
  )(input)
}

fn word(input: &str) -> IResult<&str, i64> {
  all_consuming(delimited(multispace0, alt((hexadecimal, decimal)), multispace0))(input)
}

/// Parses the text of a cell as an integer, if it is one.
pub fn parse_integer(text: &str) -> Option<i64> {
  match word(text) {
    Ok((_rest, value)) => Some(value),
    Err(_e)            => None
  }
}

/// Parses an instruction word. Values outside `0..=u32::MAX` do not fit the 32 bit format.
pub fn parse_instruction_word(text: &str) -> Option<Word> {
  parse_integer(text).and_then(|value| match value >= 0 && value <= i64::from(Word::max_value()) {
    true  => Some(value as Word),
    false => None
  })
}

fn is_hexadecimal(text: &str) -> bool {
  preceded(multispace0, hexadecimal)(text).is_ok()
}

/// Parses a data word. Decimal text must lie in the `i32` range. Hexadecimal text above
/// `0x7FFFFFFF` is taken as the two's complement bit pattern of a negative word, so
/// `0xFFFFFFFF` reads as `-1`.
pub fn parse_data_word(text: &str) -> Option<DataWord> {
  parse_integer(text).and_then(|value| {
    if value >= i64::from(DataWord::min_value()) && value <= i64::from(DataWord::max_value()) {
      Some(value as DataWord)
    } else if is_hexadecimal(text) && value <= i64::from(Word::max_value()) {
      Some(value as Word as DataWord)
    } else {
      None
    }
  })
}

/// The canonical on-disk form of an instruction word.
pub fn format_instruction_word(word: Word) -> String {
  format!("0x{:08X}", word)
}
