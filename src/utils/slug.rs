use uuid::Uuid;

// Normaliza un título a un slug apto para URL (minúsculas, solo [a-z0-9-]).
// Los títulos en hindi no producen caracteres ASCII, así que pueden quedar
// vacíos; en ese caso el caller usa fallback_slug().
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut prev_hyphen = false;

    for ch in input.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    while slug.starts_with('-') {
        slug.remove(0);
    }

    slug
}

// Slug aleatorio cuando el título no aporta nada de ASCII (ej: "समाचार")
pub fn fallback_slug(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

// Candidato n-ésimo para resolver colisiones: base, base-1, base-2, ...
pub fn suffixed(base: &str, counter: u32) -> String {
    if counter == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, counter)
    }
}

// Tope de reintentos antes de rendirnos con un error de validación
pub const MAX_SLUG_ATTEMPTS: u32 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_normalizes_title() {
        assert_eq!(slugify("Hola Mundo"), "hola-mundo");
        assert_eq!(slugify("  Breaking: News!!  "), "breaking-news");
        assert_eq!(slugify("Ya-Con-Guiones"), "ya-con-guiones");
    }

    #[test]
    fn slugify_collapses_symbol_runs() {
        assert_eq!(slugify("a   b---c"), "a-b-c");
    }

    #[test]
    fn slugify_of_devanagari_is_empty() {
        // El texto hindi no tiene ASCII alfanumérico
        assert_eq!(slugify("चंबल संदेश"), "");
    }

    #[test]
    fn fallback_slug_has_prefix_and_is_unique() {
        let a = fallback_slug("post");
        let b = fallback_slug("post");
        assert!(a.starts_with("post-"));
        assert_ne!(a, b);
    }

    #[test]
    fn suffixed_counts_from_base() {
        assert_eq!(suffixed("deportes", 0), "deportes");
        assert_eq!(suffixed("deportes", 1), "deportes-1");
        assert_eq!(suffixed("deportes", 7), "deportes-7");
    }
}
