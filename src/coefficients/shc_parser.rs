use nom::{
    character::complete::{i32 as signed_int, space0, space1, u32 as unsigned_int},
    combinator::{all_consuming, map},
    multi::{many0, separated_list1},
    number::complete::double,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use super::ShcHeader;

fn parse_usize(input: &str) -> IResult<&str, usize> {
    map(unsigned_int, |v| v as usize).parse(input)
}

/// `nmin nmax N order step start_year end_year`
pub(super) fn parse_header(input: &str) -> IResult<&str, ShcHeader> {
    map(
        all_consuming((
            preceded(space0, parse_usize),
            preceded(space1, parse_usize),
            preceded(space1, parse_usize),
            preceded(space1, parse_usize),
            preceded(space1, parse_usize),
            preceded(space1, double),
            preceded(space1, double),
            space0,
        )),
        |(nmin, nmax, n_epochs, order, step, start_year, end_year, _)| ShcHeader {
            nmin,
            nmax,
            n_epochs,
            order,
            step,
            start_year,
            end_year,
        },
    )
    .parse(input)
}

/// Whitespace separated list of epochs.
pub(super) fn parse_epochs(input: &str) -> IResult<&str, Vec<f64>> {
    all_consuming(delimited(space0, separated_list1(space1, double), space0)).parse(input)
}

/// `n m c_1 ... c_N`; the order may carry a sign for sine terms.
pub(super) fn parse_coefficient_row(input: &str) -> IResult<&str, (i32, i32, Vec<f64>)> {
    map(
        all_consuming((
            preceded(space0, signed_int),
            preceded(space1, signed_int),
            many0(preceded(space1, double)),
            space0,
        )),
        |(n, m, values, _)| (n, m, values),
    )
    .parse(input)
}

#[cfg(test)]
mod test_shc_parser {
    use super::*;

    #[test]
    fn test_parse_header() {
        let (rest, header) = parse_header("1  13 26 2 1 1900.0 2025.0").unwrap();
        assert!(rest.is_empty());
        assert_eq!(header.nmin, 1);
        assert_eq!(header.nmax, 13);
        assert_eq!(header.n_epochs, 26);
        assert_eq!(header.order, 2);
        assert_eq!(header.step, 1);
        assert_eq!(header.start_year, 1900.0);
        assert_eq!(header.end_year, 2025.0);

        assert!(parse_header("1 13 26 2 1 1900.0").is_err());
        assert!(parse_header("1 13 26 2 1 1900.0 2025.0 7").is_err());
    }

    #[test]
    fn test_parse_epochs() {
        let (_, epochs) = parse_epochs("     2015.0   2020.0  2025.0   ").unwrap();
        assert_eq!(epochs, vec![2015.0, 2020.0, 2025.0]);

        assert!(parse_epochs("2015.0 twenty").is_err());
    }

    #[test]
    fn test_parse_coefficient_row() {
        let (_, (n, m, values)) =
            parse_coefficient_row(" 1  -1   5922   5909 4523.0   ").unwrap();
        assert_eq!(n, 1);
        assert_eq!(m, -1);
        assert_eq!(values, vec![5922.0, 5909.0, 4523.0]);

        let (_, (n, m, values)) = parse_coefficient_row("13 12 0 -0.10 -0.26").unwrap();
        assert_eq!((n, m), (13, 12));
        assert_eq!(values, vec![0.0, -0.10, -0.26]);

        assert!(parse_coefficient_row("1 0 -31543 abc").is_err());
        assert!(parse_coefficient_row("1.5 0 -31543").is_err());
    }
}
