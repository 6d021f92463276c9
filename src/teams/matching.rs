use crate::teams::normalizer::{is_mascot, normalize_for_matching, strip_trailing_mascot};

/// Leading words that turn a namesake into a different program
/// ("Eastern Michigan" is not "Michigan").
const DIRECTIONAL_PREFIXES: &[&str] = &[
    "north",
    "south",
    "east",
    "west",
    "central",
    "middle",
    "coastal",
    "northern",
    "southern",
    "eastern",
    "western",
    "northeast",
    "northwest",
    "southeast",
    "southwest",
];

/// First word after a namesake that marks a sibling or branch campus
/// ("Michigan St", "Texas A&M Corpus Christi", "North Carolina Central").
const BRANCH_QUALIFIERS: &[&str] = &[
    "st",
    "tech",
    "a&m",
    "a&t",
    "central",
    "southern",
    "northern",
    "eastern",
    "western",
    "christian",
    "baptist",
    "methodist",
    "commonwealth",
    "intl",
    "atlantic",
    "gulf",
    "valley",
    "city",
    "corpus",
    "commerce",
    "kingsville",
    "greensboro",
    "asheville",
    "wilmington",
    "charlotte",
    "upstate",
    "pembroke",
    "lowell",
    "monroe",
    "martin",
    "chattanooga",
    "arlington",
    "el",
    "san",
    "rio",
    "las",
    "pine",
    "little",
    "birmingham",
    "fort",
    "milwaukee",
    "green",
    "chicago",
    "maryland",
    "marymount",
    "edwardsville",
    "poly",
    "oh",
    "pa",
    "brooklyn",
    "omaha",
    "kearney",
    "baltimore",
    "kansas",
    "college",
];

/// Same-city or shared-word programs that no structural rule separates.
const NEGATIVE_PAIRS: &[(&str, &str)] = &[
    ("miami", "miami oh"),
    ("washington", "george washington"),
    ("houston", "sam houston"),
    ("st marys", "mount st marys"),
    ("mason", "george mason"),
    ("lafayette", "louisiana"),
];

/// Directional pairs where the short form is unambiguous in everyday use
const ALLOWED_PREFIX_PAIRS: &[(&str, &str)] = &[("north carolina", "carolina")];

/// Decide whether two raw names denote the same program.
///
/// Negative rules are checked first, in both argument orders, and beat every
/// positive rule. Positive rules are exact equality, whole-token containment, and
/// the same two checks on the institution-prefix-free core forms.
pub fn are_equivalent(a: &str, b: &str) -> bool {
    let norm_a = normalize_for_matching(a);
    let norm_b = normalize_for_matching(b);
    are_normalized_equivalent(&norm_a, &norm_b)
}

/// Same as [`are_equivalent`] for names already in matching form
pub fn are_normalized_equivalent(norm_a: &str, norm_b: &str) -> bool {
    if norm_a.is_empty() || norm_b.is_empty() {
        return false;
    }
    if is_blocked(norm_a, norm_b) {
        return false;
    }
    if norm_a == norm_b || contains_either(norm_a, norm_b) {
        return true;
    }

    let core_a = core_name(norm_a);
    let core_b = core_name(norm_b);
    if core_a.is_empty() || core_b.is_empty() || is_blocked(&core_a, &core_b) {
        return false;
    }
    core_a == core_b || contains_either(&core_a, &core_b)
}

/// True when any negative rule separates the two normalized names
pub fn is_blocked(a: &str, b: &str) -> bool {
    negative_rule_fires(a, b) || negative_rule_fires(b, a)
}

fn negative_rule_fires(longer: &str, shorter: &str) -> bool {
    explicit_pair_fires(longer, shorter) || structural_rule_fires(longer, shorter)
}

fn explicit_pair_fires(x: &str, y: &str) -> bool {
    let x = strip_trailing_mascot(x);
    let y = strip_trailing_mascot(y);
    NEGATIVE_PAIRS
        .iter()
        .any(|(first, second)| x == *first && y == *second)
}

/// `shorter` occurs inside `longer` but the surrounding words name a different
/// program: a directional prefix, a branch qualifier, or any extension of a bare
/// directional word ("Southern" vs "Southern Miss").
fn structural_rule_fires(longer: &str, shorter: &str) -> bool {
    let long_tokens: Vec<&str> = longer.split_whitespace().collect();
    let short_tokens: Vec<&str> = shorter.split_whitespace().collect();
    let Some(start) = find_token_run(&long_tokens, &short_tokens) else {
        return false;
    };
    if long_tokens.len() == short_tokens.len() {
        return false;
    }

    let prefix = &long_tokens[..start];
    let suffix = &long_tokens[start + short_tokens.len()..];
    let suffix_is_mascot = !suffix.is_empty() && is_mascot(&suffix.join(" "));

    if let Some(last_prefix) = prefix.last() {
        if DIRECTIONAL_PREFIXES.contains(last_prefix) && !is_allowed_prefix_pair(longer, shorter)
        {
            return true;
        }
    }

    if suffix.is_empty() || suffix_is_mascot {
        return false;
    }
    if short_tokens.len() == 1 && DIRECTIONAL_PREFIXES.contains(&short_tokens[0]) {
        return true;
    }
    BRANCH_QUALIFIERS.contains(&suffix[0])
}

fn is_allowed_prefix_pair(longer: &str, shorter: &str) -> bool {
    let longer = strip_trailing_mascot(longer);
    ALLOWED_PREFIX_PAIRS
        .iter()
        .any(|(long, short)| longer == *long && shorter == *short)
}

fn contains_either(a: &str, b: &str) -> bool {
    let a_tokens: Vec<&str> = a.split_whitespace().collect();
    let b_tokens: Vec<&str> = b.split_whitespace().collect();
    find_token_run(&a_tokens, &b_tokens).is_some() || find_token_run(&b_tokens, &a_tokens).is_some()
}

/// Index where `needle` occurs as a contiguous run of whole tokens
fn find_token_run(haystack: &[&str], needle: &[&str]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Strip institutional prefixes that survive normalization ("univ kentucky")
fn core_name(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    loop {
        match tokens.as_slice() {
            ["univ" | "college", "of", _, ..] => {
                tokens.drain(..2);
            }
            ["univ" | "college", _, ..] => {
                tokens.remove(0);
            }
            _ => break,
        }
    }
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_match(a: &str, b: &str) {
        assert!(are_equivalent(a, b), "{a} should match {b}");
        assert!(are_equivalent(b, a), "{b} should match {a}");
    }

    fn assert_distinct(a: &str, b: &str) {
        assert!(!are_equivalent(a, b), "{a} should not match {b}");
        assert!(!are_equivalent(b, a), "{b} should not match {a}");
    }

    #[test]
    fn test_exact_and_variation_matches() {
        assert_match("Penn State", "Penn State");
        assert_match("Penn State", "Penn St.");
        assert_match("North Carolina", "UNC");
        assert_match("NC State", "North Carolina State");
        assert_match("NC State", "N.C. State");
        assert_match("PENN STATE", "penn state");
        assert_match("Boston University", "Boston Univ.");
    }

    #[test]
    fn test_matches_with_mascots() {
        assert_match("Penn State", "Penn State Nittany Lions");
        assert_match("North Carolina", "UNC Tar Heels");
        assert_match("Duke", "Duke Blue Devils");
        assert_match("University of Kentucky", "Kentucky Wildcats");
        assert_match("Tulane", "Tulane Green Wave");
        assert_match("Detroit", "Detroit Mercy");
    }

    #[test]
    fn test_core_name_match() {
        assert_match("Univ Kentucky", "Kentucky");
        assert_match("Univ. of Kentucky", "Kentucky");
    }

    #[test]
    fn test_different_programs_dont_match() {
        assert_distinct("Penn State", "North Carolina");
        assert_distinct("Duke", "Kentucky");
        assert_distinct("Boston University", "Boston College");
        assert_distinct("Kent State", "Kentucky");
    }

    #[test]
    fn test_directional_campuses_dont_merge() {
        assert_distinct("Eastern Michigan", "Michigan");
        assert_distinct("West Virginia", "Virginia");
        assert_distinct("South Carolina", "Carolina");
        assert_distinct("Southern California", "California");
        assert_distinct("Northern Iowa Panthers", "Iowa Hawkeyes");
        assert_distinct("Southern", "Southern Miss");
        assert_distinct("Southern Jaguars", "Southern Illinois");
    }

    #[test]
    fn test_suffixed_programs_dont_merge() {
        assert_distinct("Northwestern State", "Northwestern");
        assert_distinct("Michigan State", "Michigan");
        assert_distinct("Michigan State Spartans", "Michigan");
        assert_distinct("Texas A&M", "Texas");
        assert_distinct("Georgia Tech", "Georgia");
        assert_distinct("Texas A&M-Corpus Christi", "Texas A&M");
        assert_distinct("North Carolina Central", "North Carolina");
        assert_distinct("North Carolina A&T", "UNC");
        assert_distinct("UNC Greensboro", "North Carolina");
        assert_distinct("NC State", "North Carolina");
        assert_distinct("Loyola Chicago", "Loyola");
        assert_distinct("Nebraska Omaha", "Nebraska");
        assert_distinct("Maryland Baltimore County", "Maryland");
        assert_distinct("UMBC", "Maryland");
        assert_distinct("Missouri Kansas City", "Missouri");
        assert_distinct("Boston College", "Boston");
    }

    #[test]
    fn test_same_city_programs_dont_merge() {
        assert_distinct("Miami (OH)", "Miami");
        assert_distinct("Miami RedHawks", "Miami Hurricanes");
        assert_distinct("George Washington", "Washington");
        assert_distinct("Sam Houston State", "Houston");
        assert_distinct("Mount St. Mary's", "Saint Mary's");
        assert_distinct("Louisiana-Lafayette", "Lafayette");
    }

    #[test]
    fn test_allowed_prefix_pair() {
        assert_match("North Carolina", "Carolina");
        assert_match("North Carolina Tar Heels", "Carolina");
        assert_distinct("North Carolina Central", "Carolina");
    }

    #[test]
    fn test_empty_names_never_match() {
        assert!(!are_equivalent("", ""));
        assert!(!are_equivalent("Duke", ""));
    }

    #[test]
    fn test_symmetry_across_pairs() {
        let names = [
            "Penn State",
            "Penn St.",
            "North Carolina",
            "UNC Tar Heels",
            "NC State",
            "North Carolina Central",
            "Miami (OH)",
            "Miami Hurricanes",
            "Michigan",
            "Michigan State Spartans",
            "Eastern Michigan",
            "Carolina",
            "South Carolina",
            "Southern",
            "Southern Miss",
            "Texas",
            "Texas A&M",
        ];
        for a in names {
            for b in names {
                assert_eq!(are_equivalent(a, b), are_equivalent(b, a), "{a} / {b}");
            }
        }
    }
}
