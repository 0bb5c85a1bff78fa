/// Bucket holding uploaded leave forms.
pub const LEAVE_FORMS_BUCKET: &str = "leave-forms";

/// Public object URL for a stored leave form reference. References that are
/// already absolute URLs are returned unchanged.
pub fn leave_form_link(storage_public_url: Option<&str>, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Some(reference.to_string());
    }

    let base = storage_public_url?.trim_end_matches('/');
    Some(format!(
        "{}/storage/v1/object/public/{}/{}",
        base,
        LEAVE_FORMS_BUCKET,
        reference.trim_start_matches('/')
    ))
}
