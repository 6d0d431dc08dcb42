// El núcleo guarda referencias de media (ej: "posts/foto.jpg") y el
// almacenamiento real vive fuera; aquí solo resolvemos la URL absoluta
// que ve el público. Nunca exponemos la ruta interna tal cual.

pub fn resolve_media_url(reference: &Option<String>) -> Option<String> {
    let reference = reference.as_deref()?;
    if reference.is_empty() {
        return None;
    }
    // Las URLs ya absolutas (videos embebidos, CDN) se devuelven tal cual
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Some(reference.to_string());
    }
    let base = std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    Some(format!(
        "{}/uploads/{}",
        base.trim_end_matches('/'),
        reference.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_pass_through() {
        let r = Some("https://cdn.example.com/a.jpg".to_string());
        assert_eq!(
            resolve_media_url(&r).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn relative_references_get_base_and_uploads_prefix() {
        let r = Some("posts/foto.jpg".to_string());
        let url = resolve_media_url(&r).unwrap();
        assert!(url.ends_with("/uploads/posts/foto.jpg"));
        assert!(url.starts_with("http"));
    }

    #[test]
    fn none_and_empty_stay_none() {
        assert_eq!(resolve_media_url(&None), None);
        assert_eq!(resolve_media_url(&Some(String::new())), None);
    }
}
