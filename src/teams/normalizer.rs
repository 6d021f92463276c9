//! Team name normalization.
//!
//! Collapses the many spellings a scoreboard, sportsbook or model site uses for a
//! program into one matching key. The output is never meant for display: it is a
//! lowercase, token-joined string used for equality checks and storage keys.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Comparison key; keeps any trailing mascot so substring matching still works
    Matching,
    /// Storage key; additionally strips the trailing mascot
    Lookup,
}

/// Names that no general rule can separate from a different program. Keys are
/// lowercase with periods removed and whitespace collapsed; parentheses are kept
/// because they usually carry the distinguishing state.
const LITERAL_OVERRIDES: &[(&str, &str)] = &[
    ("miami (oh)", "miami oh"),
    ("miami (ohio)", "miami oh"),
    ("miami oh", "miami oh"),
    ("miami ohio", "miami oh"),
    ("miami-ohio", "miami oh"),
    ("miami redhawks", "miami oh"),
    ("miami (fl)", "miami"),
    ("miami (florida)", "miami"),
    ("miami fl", "miami"),
    ("miami florida", "miami"),
    ("miami-florida", "miami"),
    ("usc", "southern california"),
    ("usc trojans", "southern california"),
    ("usc upstate", "usc upstate"),
    ("sc upstate", "usc upstate"),
    ("south carolina upstate", "usc upstate"),
    ("unc greensboro", "unc greensboro"),
    ("unc-greensboro", "unc greensboro"),
    ("uncg", "unc greensboro"),
    ("unc wilmington", "unc wilmington"),
    ("unc-wilmington", "unc wilmington"),
    ("uncw", "unc wilmington"),
    ("unc asheville", "unc asheville"),
    ("unc-asheville", "unc asheville"),
    ("unca", "unc asheville"),
    ("unc charlotte", "charlotte"),
    ("nc a&t", "north carolina a&t"),
    ("n carolina a&t", "north carolina a&t"),
    ("nc central", "north carolina central"),
    ("n carolina central", "north carolina central"),
    ("nccu", "north carolina central"),
    ("texas a&m-corpus christi", "texas a&m corpus christi"),
    ("texas a&m corpus christi", "texas a&m corpus christi"),
    ("texas a&m-cc", "texas a&m corpus christi"),
    ("a&m-corpus christi", "texas a&m corpus christi"),
    ("texas a&m-commerce", "texas a&m commerce"),
    ("texas a&m commerce", "texas a&m commerce"),
    ("st francis (pa)", "st francis pa"),
    ("saint francis (pa)", "st francis pa"),
    ("st francis pa", "st francis pa"),
    ("st francis (ny)", "st francis brooklyn"),
    ("st francis brooklyn", "st francis brooklyn"),
    ("loyola (il)", "loyola chicago"),
    ("loyola-chicago", "loyola chicago"),
    ("loyola (md)", "loyola maryland"),
    ("loyola-maryland", "loyola maryland"),
];

/// Known cross-source aliases, applied to the token form. A key also matches when
/// followed by nothing but a mascot, so "uconn huskies" becomes "connecticut huskies".
const ALIASES: &[(&str, &str)] = &[
    ("unc", "north carolina"),
    ("north carolina st", "nc st"),
    ("uconn", "connecticut"),
    ("umass", "massachusetts"),
    ("ole miss", "mississippi"),
    ("pitt", "pittsburgh"),
    ("ucf", "central florida"),
    ("smu", "southern methodist"),
    ("tcu", "texas christian"),
    ("lsu", "louisiana st"),
    ("byu", "brigham young"),
    ("fiu", "florida intl"),
    ("fau", "florida atlantic"),
    ("fgcu", "florida gulf coast"),
    ("vcu", "virginia commonwealth"),
    ("ul lafayette", "louisiana"),
    ("louisiana lafayette", "louisiana"),
    ("ul monroe", "louisiana monroe"),
    ("ulm", "louisiana monroe"),
    ("middle tennessee st", "middle tennessee"),
    ("mtsu", "middle tennessee"),
    ("etsu", "east tennessee st"),
    ("southern mississippi", "southern miss"),
    ("app st", "appalachian st"),
    ("sam houston st", "sam houston"),
    ("tennessee martin", "ut martin"),
    ("iupui", "iu indianapolis"),
    ("uic", "illinois chicago"),
    ("siue", "siu edwardsville"),
    ("umkc", "kansas city"),
    ("umbc", "maryland baltimore county"),
    ("miami ohio", "miami oh"),
];

/// Trailing nicknames removed in lookup mode. Apostrophes are already dropped.
const MASCOTS: &[&str] = &[
    // three words
    "fighting blue hens",
    // two words
    "blue devils",
    "blue raiders",
    "blue hens",
    "blue demons",
    "tar heels",
    "crimson tide",
    "nittany lions",
    "golden eagles",
    "golden gophers",
    "golden flashes",
    "golden bears",
    "golden hurricane",
    "golden griffins",
    "golden lions",
    "red wolves",
    "red raiders",
    "red storm",
    "red foxes",
    "fighting irish",
    "fighting hawks",
    "fighting illini",
    "fighting camels",
    "sun devils",
    "delta devils",
    "demon deacons",
    "runnin bulldogs",
    "river hawks",
    "rainbow warriors",
    "horned frogs",
    "mean green",
    "green wave",
    "thundering herd",
    "black knights",
    "yellow jackets",
    "ragin cajuns",
    "great danes",
    "purple aces",
    "mountain hawks",
    "scarlet knights",
    "big red",
    "big green",
    "wolf pack",
    // one word
    "aggies",
    "anteaters",
    "antelopes",
    "badgers",
    "beacons",
    "bearcats",
    "bearkats",
    "bears",
    "beavers",
    "bengals",
    "billikens",
    "bison",
    "blazers",
    "bobcats",
    "boilermakers",
    "broncos",
    "bruins",
    "buckeyes",
    "buffaloes",
    "bulldogs",
    "bulls",
    "cardinal",
    "cardinals",
    "catamounts",
    "cavaliers",
    "chanticleers",
    "chippewas",
    "colonels",
    "commodores",
    "cornhuskers",
    "cougars",
    "cowboys",
    "crimson",
    "crusaders",
    "cyclones",
    "demons",
    "dolphins",
    "dons",
    "dragons",
    "ducks",
    "dukes",
    "eagles",
    "falcons",
    "flames",
    "flyers",
    "friars",
    "gaels",
    "gamecocks",
    "gators",
    "gophers",
    "grizzlies",
    "hawkeyes",
    "hawks",
    "highlanders",
    "hilltoppers",
    "hokies",
    "hoosiers",
    "hornets",
    "hoyas",
    "huskies",
    "hurricanes",
    "jaguars",
    "jaspers",
    "jayhawks",
    "keydets",
    "knights",
    "lancers",
    "leopards",
    "lions",
    "lobos",
    "longhorns",
    "lopes",
    "lumberjacks",
    "mastodons",
    "mavericks",
    "midshipmen",
    "miners",
    "minutemen",
    "mocs",
    "mountaineers",
    "musketeers",
    "mustangs",
    "owls",
    "panthers",
    "patriots",
    "peacocks",
    "penguins",
    "phoenix",
    "pioneers",
    "pirates",
    "quakers",
    "racers",
    "rams",
    "ramblers",
    "razorbacks",
    "rebels",
    "redhawks",
    "roadrunners",
    "rockets",
    "roos",
    "salukis",
    "seahawks",
    "seawolves",
    "seminoles",
    "sharks",
    "shockers",
    "sooners",
    "spartans",
    "spiders",
    "stags",
    "sycamores",
    "terrapins",
    "terriers",
    "texans",
    "tigers",
    "titans",
    "tritons",
    "trojans",
    "utes",
    "vandals",
    "vikings",
    "volunteers",
    "warhawks",
    "warriors",
    "wildcats",
    "wolfpack",
    "wolverines",
    "zips",
];

const MAX_MASCOT_WORDS: usize = 3;

/// Normalize a raw team name into a matching or lookup key.
///
/// Overrides are consulted first and short-circuit everything else. Otherwise the
/// name is tokenized (parentheticals, punctuation and hyphens removed), word
/// variants are collapsed (`saint`/`state` → `st`, `university` → `univ`), leading
/// institutional prefixes are dropped, and known aliases are resolved. Lookup mode
/// also removes one trailing mascot, longest first.
pub fn normalize(raw: &str, mode: NormalizeMode) -> String {
    if let Some(canonical) = literal_override(raw) {
        return canonical.to_string();
    }

    let mut tokens = tokenize(raw);
    canonicalize_words(&mut tokens);
    strip_institutional_prefix(&mut tokens);
    expand_directional_abbreviations(&mut tokens);

    if mode == NormalizeMode::Lookup {
        let kept = tokens.len() - mascot_suffix_len(&tokens);
        tokens.truncate(kept);
    }

    resolve_alias(&tokens.join(" "))
}

pub fn normalize_for_matching(raw: &str) -> String {
    normalize(raw, NormalizeMode::Matching)
}

pub fn normalize_for_lookup(raw: &str) -> String {
    normalize(raw, NormalizeMode::Lookup)
}

/// True when the (already normalized) name does not end with a mascot.
/// A single-word name that is itself a mascot word is not mascot-free.
pub fn is_mascot_free(normalized: &str) -> bool {
    let tokens: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();
    if tokens.len() == 1 && is_mascot(&tokens[0]) {
        return false;
    }
    mascot_suffix_len(&tokens) == 0
}

/// Drop one trailing mascot from an already normalized name
pub fn strip_trailing_mascot(normalized: &str) -> String {
    let tokens: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();
    let kept = tokens.len() - mascot_suffix_len(&tokens);
    tokens[..kept].join(" ")
}

pub fn is_mascot(phrase: &str) -> bool {
    MASCOTS.contains(&phrase)
}

/// All spellings worth trying when searching another source for this team
pub fn team_name_variations(raw: &str) -> Vec<String> {
    let mut variations = BTreeSet::new();
    let matching = normalize_for_matching(raw);
    let lookup = normalize_for_lookup(raw);

    variations.insert(matching.clone());
    variations.insert(lookup.clone());
    variations.insert(collapse_whitespace(&raw.to_lowercase()));

    for (key, canonical) in ALIASES {
        if *canonical == lookup {
            variations.insert(key.to_string());
        }
    }
    for (key, canonical) in LITERAL_OVERRIDES {
        if *canonical == lookup && !key.contains('(') {
            variations.insert(key.to_string());
        }
    }
    if let Some(first) = lookup.split_whitespace().next() {
        if lookup.contains(' ') {
            variations.insert(first.to_string());
        }
    }

    variations.remove("");
    variations.into_iter().collect()
}

fn literal_override(raw: &str) -> Option<&'static str> {
    let key = literal_key(raw);
    if let Some(canonical) = find_override(&key) {
        return Some(canonical);
    }

    // "Miami (Ohio) RedHawks" is still the override once the nickname is gone
    let words: Vec<String> = key.split(' ').map(str::to_string).collect();
    let mascot_len = mascot_suffix_len(&words);
    if mascot_len > 0 {
        let without_mascot = words[..words.len() - mascot_len].join(" ");
        return find_override(&without_mascot);
    }
    None
}

fn find_override(key: &str) -> Option<&'static str> {
    LITERAL_OVERRIDES
        .iter()
        .find(|(literal, _)| *literal == key)
        .map(|(_, canonical)| *canonical)
}

fn literal_key(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace(['.', '\'', '’'], "");
    collapse_whitespace(&lowered)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_parentheticals(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn tokenize(raw: &str) -> Vec<String> {
    let lowered = strip_parentheticals(&raw.to_lowercase());

    let mut spaced = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            '\'' | '’' => {}
            '&' => spaced.push_str(" & "),
            c if c.is_alphanumeric() => spaced.push(c),
            _ => spaced.push(' '),
        }
    }

    let raw_tokens: Vec<&str> = spaced.split_whitespace().collect();
    let joined = join_ampersands(&raw_tokens);
    join_initials(joined)
}

/// "a & m" becomes "a&m"; any other ampersand reads as "and".
fn join_ampersands(tokens: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token == "&" {
            let prev_single = out.last().is_some_and(|p| is_single_letter(p));
            let next_single = tokens.get(i + 1).is_some_and(|n| is_single_letter(n));
            if prev_single && next_single {
                if let Some(prev) = out.last_mut() {
                    prev.push('&');
                    prev.push_str(tokens[i + 1]);
                }
                i += 2;
                continue;
            }
            out.push("and".to_string());
        } else {
            out.push(token.to_string());
        }
        i += 1;
    }
    out
}

/// Runs of single letters ("n c" from "N.C.") collapse into one token.
fn join_initials(tokens: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut run = String::new();
    let mut run_len = 0;

    let flush = |out: &mut Vec<String>, run: &mut String, run_len: &mut usize| {
        if *run_len > 0 {
            out.push(std::mem::take(run));
            *run_len = 0;
        }
    };

    for token in tokens {
        if is_single_letter(&token) {
            run.push_str(&token);
            run_len += 1;
        } else {
            flush(&mut out, &mut run, &mut run_len);
            out.push(token);
        }
    }
    flush(&mut out, &mut run, &mut run_len);
    out
}

fn is_single_letter(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

fn canonicalize_words(tokens: &mut [String]) {
    for token in tokens.iter_mut() {
        let replacement = match token.as_str() {
            "saint" => "st",
            "state" => "st",
            "university" | "univ" => "univ",
            "college" | "coll" => "college",
            "international" | "intl" => "intl",
            "mt" => "mount",
            _ => continue,
        };
        *token = replacement.to_string();
    }
}

fn strip_institutional_prefix(tokens: &mut Vec<String>) {
    while tokens.len() > 2
        && (tokens[0] == "univ" || tokens[0] == "college")
        && tokens[1] == "of"
    {
        tokens.drain(..2);
    }
}

fn expand_directional_abbreviations(tokens: &mut [String]) {
    if tokens.len() < 2 {
        return;
    }
    let expanded = match tokens[0].as_str() {
        "se" => "southeast",
        "sw" => "southwest",
        "ne" => "northeast",
        "nw" => "northwest",
        _ => return,
    };
    tokens[0] = expanded.to_string();
}

/// Number of trailing tokens forming a mascot, longest match first. Never
/// consumes the whole name.
fn mascot_suffix_len(tokens: &[String]) -> usize {
    for words in (1..=MAX_MASCOT_WORDS).rev() {
        if tokens.len() <= words {
            continue;
        }
        let tail = tokens[tokens.len() - words..].join(" ");
        if is_mascot(&tail) {
            return words;
        }
    }
    0
}

fn resolve_alias(name: &str) -> String {
    for (key, canonical) in ALIASES {
        if name == *key {
            return canonical.to_string();
        }
        if let Some(rest) = name.strip_prefix(key).and_then(|r| r.strip_prefix(' ')) {
            if is_mascot(rest) {
                return format!("{} {}", canonical, rest);
            }
        }
    }
    name.to_string()
}
