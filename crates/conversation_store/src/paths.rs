/// Maps a user identity onto a filesystem-safe name.
#[must_use]
pub fn sanitize_user_id(user_id: &str) -> String {
    user_id
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | ' ' | '.' => '-',
            _ => c,
        })
        .collect()
}

/// File name of one user's conversation document.
#[must_use]
pub fn document_file_name(user_id: &str) -> String {
    format!("{}.json", sanitize_user_id(user_id))
}
