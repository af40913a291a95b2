//! `from X to Y` range grammar shared by number and date values.
//!
//! Keywords are whitespace-delimited and case-insensitive; either bound may
//! be missing. A value without keywords is a bare value.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RangeSpec {
    Bare(String),
    Between {
        from: Option<String>,
        to: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    None,
    From,
    To,
}

pub(super) fn parse_range_spec(value: &str) -> RangeSpec {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let is_keyword = |t: &str| t.eq_ignore_ascii_case("from") || t.eq_ignore_ascii_case("to");
    if !tokens.iter().any(|t| is_keyword(t)) {
        return RangeSpec::Bare(value.trim().to_string());
    }

    let mut from: Vec<&str> = Vec::new();
    let mut to: Vec<&str> = Vec::new();
    let mut slot = Slot::None;
    for token in tokens {
        if token.eq_ignore_ascii_case("from") {
            slot = Slot::From;
        } else if token.eq_ignore_ascii_case("to") {
            slot = Slot::To;
        } else {
            match slot {
                Slot::From => from.push(token),
                Slot::To => to.push(token),
                // text before the first keyword is ignored
                Slot::None => {}
            }
        }
    }

    let join = |parts: Vec<&str>| (!parts.is_empty()).then(|| parts.join(" "));
    RangeSpec::Between {
        from: join(from),
        to: join(to),
    }
}
