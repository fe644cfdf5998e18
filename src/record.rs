use crate::error::Rejection;

/// Delimiter between numeric fields within one record.
const FIELD_DELIMITER: char = ',';

/// Parses one textual record into an ordered list of numeric fields.
///
/// Strict all-or-nothing: a record is either fully numeric CSV or entirely
/// rejected. Mixed records like `12.3,abc,4.5` yield no partial sample; the
/// caller drops rejections without surfacing them, favoring robustness to
/// noisy instrument output over error reporting.
pub fn parse_record(record: &str) -> Result<Vec<f64>, Rejection> {
    let record = record.trim();
    if record.is_empty() {
        return Err(Rejection::Empty);
    }
    record
        .split(FIELD_DELIMITER)
        .map(|field| field.trim().parse::<f64>().map_err(|_| Rejection::NonNumeric))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_csv_parses_in_order() {
        assert_eq!(parse_record("1,2.5,-3e2"), Ok(vec![1.0, 2.5, -300.0]));
    }

    #[test]
    fn fields_are_trimmed_individually() {
        assert_eq!(parse_record("  1 , 2 ,3  "), Ok(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn single_field_record() {
        assert_eq!(parse_record("42"), Ok(vec![42.0]));
    }

    #[test]
    fn empty_after_trim_is_rejected_as_empty() {
        assert_eq!(parse_record(""), Err(Rejection::Empty));
        assert_eq!(parse_record("   \t "), Err(Rejection::Empty));
    }

    #[test]
    fn one_bad_field_rejects_the_whole_record() {
        assert_eq!(parse_record("12.3,abc,4.5"), Err(Rejection::NonNumeric));
        assert_eq!(parse_record("1,,3"), Err(Rejection::NonNumeric));
        assert_eq!(parse_record("nanometers"), Err(Rejection::NonNumeric));
    }
}
