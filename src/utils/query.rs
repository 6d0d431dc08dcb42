// Los flags de query string llegan como texto; solo "true" activa el
// filtro, cualquier otro valor se ignora (nunca es un error)
pub fn flag(value: &Option<String>) -> Option<bool> {
    match value.as_deref() {
        Some("true") => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_literal_true_activates_the_filter() {
        assert_eq!(flag(&Some("true".into())), Some(true));
        assert_eq!(flag(&Some("false".into())), None);
        assert_eq!(flag(&Some("TRUE".into())), None);
        assert_eq!(flag(&Some("1".into())), None);
        assert_eq!(flag(&None), None);
    }
}
