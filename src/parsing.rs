//! Small `nom` parsers for the textual arguments accepted by the tools: numbers written in
//! decimal or `0x`-prefixed hexadecimal, and `ADDRESS=VALUE` pairs.

use std::convert::TryFrom;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    combinator::{all_consuming, map_res},
    error::ErrorKind,
    sequence::{preceded, separated_pair},
    IResult,
};

use crate::error::ParseError;

type Result<'a, T> = IResult<&'a str, T, (&'a str, ErrorKind)>;

fn take_u32(base: u32) -> impl Fn(&str) -> Result<'_, u32> {
    move |input: &str| {
        map_res(take_while1(move |c: char| c.is_digit(base)), move |s| {
            u32::from_str_radix(s, base)
        })(input)
    }
}

fn take_number(input: &str) -> Result<'_, u32> {
    alt((preceded(tag_no_case("0x"), take_u32(16)), take_u32(10)))(input)
}

fn take_pair(input: &str) -> Result<'_, (u32, u32)> {
    separated_pair(take_number, tag("="), take_number)(input)
}

fn to_u16(input: &str, value: u32) -> std::result::Result<u16, ParseError> {
    u16::try_from(value).map_err(|_| ParseError::new(input, "a 16-bit number"))
}

/// Parses a 16-bit number in decimal or `0x` hexadecimal notation.
pub fn parse_u16(input: &str) -> std::result::Result<u16, ParseError> {
    let input = input.trim();

    match all_consuming(take_number)(input) {
        Ok((_, value)) => to_u16(input, value),
        Err(_) => Err(ParseError::new(input, "a number")),
    }
}

/// Parses an `ADDRESS=VALUE` pair of 16-bit numbers.
pub fn parse_pair(input: &str) -> std::result::Result<(u16, u16), ParseError> {
    let input = input.trim();

    match all_consuming(take_pair)(input) {
        Ok((_, (address, value))) => Ok((to_u16(input, address)?, to_u16(input, value)?)),
        Err(_) => Err(ParseError::new(input, "ADDRESS=VALUE")),
    }
}
