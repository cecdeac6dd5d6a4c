use serde::Serialize;

use crate::error::{Error, Result};
use crate::images::registry::ImageRegistry;

/// The registry is pruned periodically, so every run rebuilds the base
/// image to guarantee the builders have a fresh one underneath them.
pub const BASE_IMAGE: &str = "openshift/base";
pub const BASE_IMAGE_VERSION: &str = "1";
pub const BASE_IMAGE_REF: &str = "master";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    pub name: String,
    pub version: String,
    pub git_ref: String,
    pub repo_url: String,
}

/// The ordered, resolved list of images for one run, plus the names
/// that were configured but are not in the known-images table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    pub images: Vec<ImageSpec>,
    pub skipped: Vec<String>,
}

struct Token {
    name: String,
    version: String,
    git_ref: String,
}

fn parse_token(token: &str) -> Result<Token> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(Error::validation_invalid_argument(
            "buildImages",
            "Image spec must be name:version:gitRef",
            Some(token.to_string()),
        ));
    }

    Ok(Token {
        name: parts[0].to_string(),
        version: parts[1].to_string(),
        git_ref: parts[2].to_string(),
    })
}

/// Parse a comma-separated list of `name:version:gitRef` specs into a
/// build plan.
///
/// The base image is prepended when not configured. Unknown names are
/// excluded and reported as skipped; a malformed token is the only
/// hard error, raised before any remote command is issued.
pub fn resolve(config: &str, known: &ImageRegistry) -> Result<BuildPlan> {
    let mut tokens: Vec<Token> = config
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(parse_token)
        .collect::<Result<Vec<_>>>()?;

    if !tokens.iter().any(|t| t.name == BASE_IMAGE) {
        tokens.insert(
            0,
            Token {
                name: BASE_IMAGE.to_string(),
                version: BASE_IMAGE_VERSION.to_string(),
                git_ref: BASE_IMAGE_REF.to_string(),
            },
        );
    }

    let mut images = Vec::with_capacity(tokens.len());
    let mut skipped = Vec::new();

    for token in tokens {
        match known.lookup(&token.name) {
            Some(repo_url) => images.push(ImageSpec {
                name: token.name,
                version: token.version,
                git_ref: token.git_ref,
                repo_url: repo_url.to_string(),
            }),
            None => {
                log_status!("images", "Unregistered image: {}, skipping", token.name);
                skipped.push(token.name);
            }
        }
    }

    Ok(BuildPlan { images, skipped })
}
