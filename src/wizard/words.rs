//! Spelled-out dollar amounts for the offer documents
//! ("Seven Hundred Fifty Thousand and 00/100").

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];
const TEENS: [&str; 10] = [
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

fn hundreds(n: u64) -> String {
    let mut result = String::new();
    let hundred = n / 100;
    let remainder = n % 100;
    let ten = remainder / 10;
    let one = remainder % 10;

    if hundred > 0 {
        result.push_str(ONES[hundred as usize]);
        result.push_str(" Hundred");
        if remainder > 0 {
            result.push(' ');
        }
    }

    if (10..20).contains(&remainder) {
        result.push_str(TEENS[(remainder - 10) as usize]);
    } else {
        if ten > 0 {
            result.push_str(TENS[ten as usize]);
        }
        if ten > 0 && one > 0 {
            result.push('-');
        }
        if one > 0 {
            result.push_str(ONES[one as usize]);
        }
    }

    result
}

/// Spell out a whole-dollar amount in the "<words> and 00/100" form used on
/// purchase-offer paperwork. Supports amounts below one billion dollars.
pub fn amount_in_words(amount: u64) -> String {
    if amount == 0 {
        return "Zero and 00/100".to_string();
    }

    let million = amount / 1_000_000;
    let thousand = (amount % 1_000_000) / 1_000;
    let hundred = amount % 1_000;

    let mut words = String::new();

    if million > 0 {
        words.push_str(&hundreds(million));
        words.push_str(" Million");
        if thousand > 0 || hundred > 0 {
            words.push(' ');
        }
    }

    if thousand > 0 {
        words.push_str(&hundreds(thousand));
        words.push_str(" Thousand");
        if hundred > 0 {
            words.push(' ');
        }
    }

    if hundred > 0 {
        words.push_str(&hundreds(hundred));
    }

    format!("{} and 00/100", words.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert_eq!(amount_in_words(0), "Zero and 00/100");
    }

    #[test]
    fn small_amounts() {
        assert_eq!(amount_in_words(5), "Five and 00/100");
        assert_eq!(amount_in_words(13), "Thirteen and 00/100");
        assert_eq!(amount_in_words(42), "Forty-Two and 00/100");
        assert_eq!(amount_in_words(90), "Ninety and 00/100");
    }

    #[test]
    fn hundreds_and_teens() {
        assert_eq!(amount_in_words(100), "One Hundred and 00/100");
        assert_eq!(amount_in_words(115), "One Hundred Fifteen and 00/100");
        assert_eq!(amount_in_words(321), "Three Hundred Twenty-One and 00/100");
    }

    #[test]
    fn typical_offer_prices() {
        assert_eq!(
            amount_in_words(750_000),
            "Seven Hundred Fifty Thousand and 00/100"
        );
        assert_eq!(
            amount_in_words(1_250_000),
            "One Million Two Hundred Fifty Thousand and 00/100"
        );
        assert_eq!(
            amount_in_words(999_999),
            "Nine Hundred Ninety-Nine Thousand Nine Hundred Ninety-Nine and 00/100"
        );
    }

    #[test]
    fn round_million_has_no_trailing_space() {
        assert_eq!(amount_in_words(2_000_000), "Two Million and 00/100");
        assert_eq!(amount_in_words(1_000_005), "One Million Five and 00/100");
    }
}
