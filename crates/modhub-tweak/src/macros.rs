//! Convenience macros for tweak development.

/// Macro for creating a simple tweak info struct.
///
/// # Example
/// ```rust,ignore
/// let info = tweak_info!(
///     id: "my-tweak",
///     name: "My Tweak",
///     version: "1.0.0",
///     description: "Does things",
///     author: "Dev"
/// );
/// ```
#[macro_export]
macro_rules! tweak_info {
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr
    ) => {
        $crate::prelude::TweakInfo {
            id: $id.to_string(),
            name: $name.to_string(),
            version: $version.to_string(),
            description: $desc.to_string(),
            author: $author.to_string(),
            patches: Vec::new(),
        }
    };
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr,
        patches: [$($patch:expr),* $(,)?]
    ) => {
        $crate::prelude::TweakInfo {
            id: $id.to_string(),
            name: $name.to_string(),
            version: $version.to_string(),
            description: $desc.to_string(),
            author: $author.to_string(),
            patches: vec![$($patch.to_string()),*],
        }
    };
}
