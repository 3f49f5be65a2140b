use super::{Hash, UncheckedLeap, UncheckedList};
use crate::date::*;

use nom::branch::*;
use nom::bytes::complete::*;
use nom::character::complete::*;
use nom::combinator::*;
use nom::error::{context, VerboseError};
use nom::multi::*;
use nom::sequence::*;
use std::convert::TryInto;
use std::str::FromStr;

type Result<'a, O> = nom::IResult<&'a str, O, VerboseError<&'a str>>;

fn dec64(input: &str) -> Result<'_, i64> {
    map_res(digit1, i64::from_str)(input)
}

fn hex32(input: &str) -> Result<'_, u32> {
    map_res(hex_digit1, |s| u32::from_str_radix(s, 16))(input)
}

fn month(input: &str) -> Result<'_, i32> {
    alt((
        value(1, tag("Jan")),
        value(2, tag("Feb")),
        value(3, tag("Mar")),
        value(4, tag("Apr")),
        value(5, tag("May")),
        value(6, tag("Jun")),
        value(7, tag("Jul")),
        value(8, tag("Aug")),
        value(9, tag("Sep")),
        value(10, tag("Oct")),
        value(11, tag("Nov")),
        value(12, tag("Dec")),
    ))(input)
}

fn date(input: &str) -> Result<'_, Gregorian> {
    map(
        tuple((
            preceded(space1, dec64),
            preceded(space1, month),
            preceded(space1, dec64),
        )),
        |(d, m, y)| Gregorian(y as i32, m, d as i32),
    )(input)
}

fn empty(input: &str) -> Result<'_, ()> {
    value((), pair(tag("#"), line_ending))(input)
}

fn comment(input: &str) -> Result<'_, ()> {
    value((), tuple((tag("#"), space1, not_line_ending, line_ending)))(input)
}

fn ignore(input: &str) -> Result<'_, ()> {
    value((), many0_count(alt((empty, comment))))(input)
}

fn updated(input: &str) -> Result<'_, i64> {
    context(
        "updated",
        delimited(pair(tag("#$"), space1), dec64, line_ending),
    )(input)
}

fn expires(input: &str) -> Result<'_, i64> {
    context(
        "expires",
        delimited(pair(tag("#@"), space1), dec64, line_ending),
    )(input)
}

fn leapsecs(input: &str) -> Result<'_, Vec<UncheckedLeap>> {
    context(
        "leap second",
        many1(tuple((
            terminated(dec64, space1),
            terminated(dec64, space1),
            delimited(tag("#"), date, pair(space0, line_ending)),
        ))),
    )(input)
}

fn hash(input: &str) -> Result<'_, Hash> {
    let (rest, words) = context(
        "hash",
        delimited(tag("#h"), count(preceded(space1, hex32), 5), line_ending),
    )(input)?;
    // count() gave us exactly five
    let words: [u32; 5] = words.try_into().unwrap_or_default();
    Ok((rest, Hash(words)))
}

pub(super) fn parse(input: &str) -> Result<'_, UncheckedList> {
    map(
        tuple((
            preceded(ignore, updated),
            preceded(ignore, expires),
            preceded(ignore, leapsecs),
            preceded(ignore, hash),
        )),
        |(updated, expires, leapsecs, hash)| UncheckedList {
            updated,
            expires,
            leapsecs,
            hash,
        },
    )(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test() {
        let text = "#\n# comment\n#$\t 3976560000\n#@\t 4007404800\n\
                    2272060800\t10\t# 1 Jan 1972\n\
                    2287785600\t11\t# 1 Jul 1972\n\
                    #\n#h\t0 1 2 3 deadbeef\n";
        let (rest, list) = parse(text).unwrap();
        assert_eq!(rest, "");
        assert_eq!(list.updated, 3976560000);
        assert_eq!(list.expires, 4007404800);
        assert_eq!(
            list.leapsecs,
            vec![
                (2272060800, 10, Gregorian(1972, 1, 1)),
                (2287785600, 11, Gregorian(1972, 7, 1)),
            ]
        );
        assert_eq!(list.hash, Hash([0, 1, 2, 3, 0xdeadbeef]));
    }

    #[test]
    fn short_hash() {
        let text = "#$ 1\n#@ 2\n3 4 # 1 Jan 1972\n#h 0 1 2 3\n";
        assert!(parse(text).is_err());
    }
}
