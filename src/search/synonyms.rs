/// Pairs of interchangeable ingredient names. A term matches a field that
/// contains the term itself or its counterpart.
const SYNONYM_PAIRS: &[(&str, &str)] = &[
    ("蛋", "鸡蛋"),
    ("番茄", "西红柿"),
    ("土豆", "马铃薯"),
];

/// Counterparts of `term` (already lower-cased) in the synonym table.
pub fn counterparts(term: &str) -> impl Iterator<Item = &'static str> + '_ {
    SYNONYM_PAIRS.iter().filter_map(move |&(left, right)| {
        if term == left {
            Some(right)
        } else if term == right {
            Some(left)
        } else {
            None
        }
    })
}
