//! The starter template for freshly created vaults.

/// Written when `init-repo` is run without a source env file.
pub const TEMPLATE: &str = "\
# Environment variables for this project.
# Lines are KEY=value; '#' starts a comment.
#
# DATABASE_URL=postgres://localhost/dev
# API_KEY=
";
