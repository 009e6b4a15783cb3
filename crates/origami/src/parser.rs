//! Instruction grammar (nom).
//!
//! Lines:
//! - `paper dimensions: [r]` or `[w, h]`
//! - `fold <from> to top|bottom of <to> [carry <names>] [pin <names>]`
//! - `fold <from> around <axis> [<angle>] [carry <names>] [pin <names>]`
//! - compact forms `<from> to <to> V|M` and `<from> around <axis> V|M [<angle>]`
//!
//! A name list is `[n1, n2, …]` or one bare name; names are `[A-Za-z0-9_]+`.
//! Keywords are case-insensitive; whitespace between tokens is free.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1, one_of, satisfy},
    combinator::{all_consuming, map, not, opt, peek, value},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, preceded, terminated},
    IResult,
};
use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};

/// Paper dimensions as written on the first line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Dimensions {
    /// Aspect ratio `width / height`.
    Ratio(f64),
    Size { width: f64, height: f64 },
}

impl Dimensions {
    pub fn ratio(&self) -> f64 {
        match *self {
            Dimensions::Ratio(r) => r,
            Dimensions::Size { width, height } => width / height,
        }
    }
}

/// Valley folds the flap up over the stationary paper (`top`, `V`); mountain folds it under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Valley,
    Mountain,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Bring `from` onto `to`.
    Translate { to: Vec<String>, sense: Sense },
    /// Turn the `from` side about the axis; `None` means the configured default angle.
    Rotate {
        axis: [String; 2],
        angle_deg: Option<f64>,
        sense: Sense,
    },
}

/// One parsed fold line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub from: Vec<String>,
    pub motion: Motion,
    pub carry: Vec<String>,
    pub pin: Vec<String>,
}

/// Parse the dimensions line.
pub fn parse_dimensions(text: &str) -> FoldResult<Dimensions> {
    let (_, nums) = all_consuming(delimited(multispace0, dimensions, multispace0))(text)
        .map_err(|_| FoldError::parse(format!("expected `paper dimensions: [..]`, got `{text}`")))?;
    if nums.iter().any(|x| !x.is_finite() || *x <= 0.0) {
        return Err(FoldError::parse(format!(
            "paper dimensions must be positive and finite, got `{text}`"
        )));
    }
    match nums.as_slice() {
        [r] => Ok(Dimensions::Ratio(*r)),
        [w, h] => Ok(Dimensions::Size {
            width: *w,
            height: *h,
        }),
        _ => Err(FoldError::parse(format!(
            "paper dimensions take one or two numbers, got {}",
            nums.len()
        ))),
    }
}

/// Parse one fold line (long or compact grammar).
pub fn parse_instruction(text: &str) -> FoldResult<Instruction> {
    let line = delimited(
        multispace0,
        alt((long_translation, long_rotation, compact_translation, compact_rotation)),
        multispace0,
    );
    all_consuming(line)(text)
        .map(|(_, ins)| ins)
        .map_err(|_| FoldError::parse(format!("unrecognized instruction `{}`", text.trim())))
}

fn dimensions(input: &str) -> IResult<&str, Vec<f64>> {
    let (input, _) = keyword("paper")(input)?;
    let (input, _) = preceded(multispace1, keyword("dimensions"))(input)?;
    let (input, _) = preceded(multispace0, char(':'))(input)?;
    preceded(
        multispace0,
        delimited(
            char('['),
            separated_list1(ws(char(',')), ws(double)),
            char(']'),
        ),
    )(input)
}

fn long_translation(input: &str) -> IResult<&str, Instruction> {
    let (input, _) = keyword("fold")(input)?;
    let (input, from) = preceded(multispace1, name_list)(input)?;
    let (input, _) = preceded(multispace1, keyword("to"))(input)?;
    let (input, sense) = preceded(
        multispace1,
        alt((
            value(Sense::Valley, keyword("top")),
            value(Sense::Mountain, keyword("bottom")),
        )),
    )(input)?;
    let (input, _) = preceded(multispace1, keyword("of"))(input)?;
    let (input, to) = preceded(multispace1, name_list)(input)?;
    let (input, (carry, pin)) = extras(input)?;
    Ok((
        input,
        Instruction {
            from,
            motion: Motion::Translate { to, sense },
            carry,
            pin,
        },
    ))
}

fn long_rotation(input: &str) -> IResult<&str, Instruction> {
    let (input, _) = keyword("fold")(input)?;
    let (input, from) = preceded(multispace1, name_list)(input)?;
    let (input, _) = preceded(multispace1, keyword("around"))(input)?;
    let (input, axis) = preceded(multispace1, axis_pair)(input)?;
    let (input, angle_deg) = opt(preceded(multispace1, double))(input)?;
    let (input, (carry, pin)) = extras(input)?;
    Ok((
        input,
        Instruction {
            from,
            motion: Motion::Rotate {
                axis,
                angle_deg,
                sense: Sense::Valley,
            },
            carry,
            pin,
        },
    ))
}

fn compact_translation(input: &str) -> IResult<&str, Instruction> {
    let (input, from) = name_list(input)?;
    let (input, _) = preceded(multispace1, keyword("to"))(input)?;
    let (input, to) = preceded(multispace1, name_list)(input)?;
    let (input, sense) = preceded(multispace1, sense_letter)(input)?;
    Ok((
        input,
        Instruction {
            from,
            motion: Motion::Translate { to, sense },
            carry: Vec::new(),
            pin: Vec::new(),
        },
    ))
}

fn compact_rotation(input: &str) -> IResult<&str, Instruction> {
    let (input, from) = name_list(input)?;
    let (input, _) = preceded(multispace1, keyword("around"))(input)?;
    let (input, axis) = preceded(multispace1, axis_pair)(input)?;
    let (input, sense) = preceded(multispace1, sense_letter)(input)?;
    let (input, angle_deg) = opt(preceded(multispace1, double))(input)?;
    Ok((
        input,
        Instruction {
            from,
            motion: Motion::Rotate {
                axis,
                angle_deg,
                sense,
            },
            carry: Vec::new(),
            pin: Vec::new(),
        },
    ))
}

fn extras(input: &str) -> IResult<&str, (Vec<String>, Vec<String>)> {
    let (input, carry) = opt(preceded(
        preceded(multispace1, keyword("carry")),
        preceded(multispace1, name_list),
    ))(input)?;
    let (input, pin) = opt(preceded(
        preceded(multispace1, keyword("pin")),
        preceded(multispace1, name_list),
    ))(input)?;
    Ok((input, (carry.unwrap_or_default(), pin.unwrap_or_default())))
}

fn sense_letter(input: &str) -> IResult<&str, Sense> {
    terminated(
        map(one_of("VvMm"), |c| {
            if c.eq_ignore_ascii_case(&'v') {
                Sense::Valley
            } else {
                Sense::Mountain
            }
        }),
        word_end,
    )(input)
}

/// Exactly two names; a bare name or a longer list fails the line.
fn axis_pair(input: &str) -> IResult<&str, [String; 2]> {
    let (rest, names) = bracketed_names(input)?;
    match <[String; 2]>::try_from(names) {
        Ok(pair) => Ok((rest, pair)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

fn name_list(input: &str) -> IResult<&str, Vec<String>> {
    alt((bracketed_names, map(name, |n| vec![n])))(input)
}

fn bracketed_names(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        char('['),
        separated_list1(ws(char(',')), ws(name)),
        char(']'),
    )(input)
}

fn name(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        str::to_string,
    )(input)
}

fn keyword<'a>(k: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(k), word_end)
}

fn word_end(input: &str) -> IResult<&str, ()> {
    not(peek(satisfy(|c: char| c.is_ascii_alphanumeric() || c == '_')))(input)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn dimensions_ratio_and_size() {
        assert_eq!(
            parse_dimensions("paper dimensions: [1]").unwrap(),
            Dimensions::Ratio(1.0)
        );
        let d = parse_dimensions("  Paper Dimensions :[ 20 , 10 ] ").unwrap();
        assert_eq!(
            d,
            Dimensions::Size {
                width: 20.0,
                height: 10.0
            }
        );
        assert!((d.ratio() - 2.0).abs() < 1e-12);
        for bad in [
            "paper dimensions: [0]",
            "paper dimensions: [-2, 1]",
            "paper dimensions: [1, 2, 3]",
            "paper dimensions: []",
            "dimensions: [1]",
        ] {
            assert!(
                matches!(parse_dimensions(bad), Err(FoldError::Parse { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn long_translation_with_extras() {
        let ins = parse_instruction("fold [a, b] to bottom of [c,d] carry [e] pin f").unwrap();
        assert_eq!(ins.from, s(&["a", "b"]));
        assert_eq!(
            ins.motion,
            Motion::Translate {
                to: s(&["c", "d"]),
                sense: Sense::Mountain
            }
        );
        assert_eq!(ins.carry, s(&["e"]));
        assert_eq!(ins.pin, s(&["f"]));
        let ins = parse_instruction("fold a to top of e").unwrap();
        assert!(matches!(
            ins.motion,
            Motion::Translate {
                sense: Sense::Valley,
                ..
            }
        ));
        assert!(ins.carry.is_empty() && ins.pin.is_empty());
    }

    #[test]
    fn long_rotation_angle_is_optional() {
        let ins = parse_instruction("fold a around [e, f] -90.5").unwrap();
        assert_eq!(
            ins.motion,
            Motion::Rotate {
                axis: ["e".into(), "f".into()],
                angle_deg: Some(-90.5),
                sense: Sense::Valley
            }
        );
        let ins = parse_instruction("fold [a,d] around [e,f] pin b").unwrap();
        assert!(matches!(
            ins.motion,
            Motion::Rotate {
                angle_deg: None,
                ..
            }
        ));
        assert_eq!(ins.pin, s(&["b"]));
    }

    #[test]
    fn axis_needs_exactly_two_names() {
        for bad in [
            "fold a around e",
            "fold a around [e]",
            "fold a around [e, f, g] 90",
        ] {
            assert!(
                matches!(parse_instruction(bad), Err(FoldError::Parse { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn compact_forms() {
        let ins = parse_instruction("a to e V").unwrap();
        assert_eq!(ins.from, s(&["a"]));
        assert_eq!(
            ins.motion,
            Motion::Translate {
                to: s(&["e"]),
                sense: Sense::Valley
            }
        );
        let ins = parse_instruction("[a,d] around [e,f] M 90").unwrap();
        assert_eq!(
            ins.motion,
            Motion::Rotate {
                axis: ["e".into(), "f".into()],
                angle_deg: Some(90.0),
                sense: Sense::Mountain
            }
        );
    }

    #[test]
    fn garbage_is_a_parse_error() {
        for bad in ["fold a onto b", "a to e X", "fold a to top e", "hello"] {
            let err = parse_instruction(bad).unwrap_err();
            assert!(matches!(err, FoldError::Parse { .. }), "{bad}");
            assert!(format!("{err}").contains(bad));
        }
    }
}
