use serde::Serialize;

use crate::context::RunContext;
use crate::error::Result;
use crate::images::registry::ImageRegistry;
use crate::images::resolver::{self, BuildPlan};
use crate::images::script::{self, ScriptStep};
use crate::ssh::SshClient;
use crate::step::{Step, StepReport};

/// Ensure the registry URL ends with a path separator so image
/// references can be formed by plain concatenation.
pub fn normalize_registry(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Assemble the full command plan for one run.
///
/// Build steps for every image come before the first push step: no
/// image is pushed until every image in the plan has built and passed
/// its tests. The staleness probe covers the whole known-images table,
/// not just the plan.
pub fn command_plan(plan: &BuildPlan, registry_url: &str, known: &ImageRegistry) -> Vec<ScriptStep> {
    let registry = normalize_registry(registry_url);

    let mut steps = vec![
        ScriptStep::InsecureRegistryFix {
            registry: registry.clone(),
        },
        ScriptStep::PrePullBase {
            registry: registry.clone(),
        },
        ScriptStep::ToolPathSetup,
    ];

    for image in &plan.images {
        steps.push(ScriptStep::BuildImage {
            name: image.name.clone(),
            version: image.version.clone(),
            git_ref: image.git_ref.clone(),
            repo_url: image.repo_url.clone(),
        });
    }

    for image in &plan.images {
        steps.push(ScriptStep::PushImage {
            name: image.name.clone(),
            git_ref: image.git_ref.clone(),
            registry: registry.clone(),
        });
    }

    steps.push(ScriptStep::StalenessProbe {
        registry,
        images: known
            .iter()
            .map(|(n, u)| (n.to_string(), u.to_string()))
            .collect(),
    });

    steps
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrateResult {
    pub exit_code: i32,
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

/// Render the command plan and run it as a single remote invocation.
///
/// The script's exit code is logged and returned, never interpreted
/// here - whether a failure gates later pipeline steps is the
/// caller's decision.
pub fn orchestrate(
    plan: &BuildPlan,
    registry_url: &str,
    known: &ImageRegistry,
    client: &SshClient,
) -> OrchestrateResult {
    let steps = command_plan(plan, registry_url, known);
    let script = script::render(&steps);

    log_status!(
        "images",
        "Building and pushing {} image(s) to {}",
        plan.images.len(),
        normalize_registry(registry_url)
    );

    let output = client.execute(&script);
    if !output.success {
        log_status!(
            "images",
            "Remote image script exited with {}: {}",
            output.exit_code,
            output.stderr
        );
    }

    OrchestrateResult {
        exit_code: output.exit_code,
        success: output.success,
        stderr: output.stderr,
    }
}

/// Chain step that resolves the configured image set and runs the
/// build/test/push orchestration.
pub struct ImagesStep {
    pub build_images: String,
    pub registry: String,
}

impl Step for ImagesStep {
    fn name(&self) -> &'static str {
        "images"
    }

    fn run(&self, ctx: &mut RunContext) -> Result<StepReport> {
        let known = ImageRegistry::openshift_defaults();
        let plan = resolver::resolve(&self.build_images, &known)?;

        let mut warnings: Vec<String> = plan
            .skipped
            .iter()
            .map(|name| format!("Unregistered image: {}", name))
            .collect();

        let result = orchestrate(&plan, &self.registry, &known, &ctx.client);

        if result.success {
            if warnings.is_empty() {
                Ok(StepReport::success(self.name()))
            } else {
                Ok(StepReport::partial(self.name(), warnings))
            }
        } else {
            warnings.push(format!(
                "Remote image script exited with {}",
                result.exit_code
            ));
            Ok(StepReport {
                step: self.name().to_string(),
                status: crate::step::StepStatus::Failed,
                warnings,
                error: Some(format!(
                    "Remote image script failed with exit code {}",
                    result.exit_code
                )),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::resolver::resolve;

    fn known() -> ImageRegistry {
        ImageRegistry::new(vec![
            ("openshift/base", "https://github.com/openshift/sti-base"),
            ("myimg", "https://github.com/example/myimg"),
        ])
    }

    #[test]
    fn registry_url_normalized_to_trailing_slash() {
        assert_eq!(normalize_registry("reg.example.com"), "reg.example.com/");
        assert_eq!(normalize_registry("reg.example.com/"), "reg.example.com/");
    }

    #[test]
    fn scenario_single_image_with_bare_registry() {
        let known = known();
        let plan = resolve("myimg:2.0:abc123", &known).unwrap();
        assert_eq!(plan.images.len(), 2);
        assert_eq!(plan.images[0].name, "openshift/base");
        assert_eq!(plan.images[1].name, "myimg");

        let script = script::render(&command_plan(&plan, "reg.example.com", &known));

        // two build blocks, each followed later by grouped pushes
        assert_eq!(script.matches("rm -rf ${dest_dir}; mkdir -p ${dest_dir}").count(), 2);
        assert_eq!(script.matches("for i in {0..2}; do").count(), 2);
        assert_eq!(script.matches("for i in {0..1}; do").count(), 2);

        // every push references the normalized registry
        assert!(script.contains("docker push -f reg.example.com/myimg-centos7:$git_ref"));
        assert!(script.contains("docker push -f reg.example.com/myimg-rhel7:latest"));
    }

    #[test]
    fn all_builds_precede_all_pushes() {
        let known = known();
        let plan = resolve("myimg:2.0:abc123", &known).unwrap();
        let script = script::render(&command_plan(&plan, "reg.example.com/", &known));

        let last_build = script.rfind("sudo make test").unwrap();
        let first_push = script.find("docker push -f").unwrap();
        assert!(
            last_build < first_push,
            "push block appeared before the last build block"
        );
    }

    #[test]
    fn skipped_image_gets_no_build_block() {
        let known = known();
        let plan = resolve("foo:1:abcd", &known).unwrap();
        assert_eq!(plan.skipped, vec!["foo"]);

        let script = script::render(&command_plan(&plan, "reg.example.com/", &known));
        assert!(!script.contains("/tmp/images/foo"));
        assert!(!script.contains("foo-centos7"));
    }

    #[test]
    fn probe_covers_known_images_not_just_plan() {
        let known = known();
        let plan = resolve("myimg:2.0:abc123", &known).unwrap();
        let steps = command_plan(&plan, "reg.example.com/", &known);

        let probe = steps
            .iter()
            .find_map(|s| match s {
                ScriptStep::StalenessProbe { images, .. } => Some(images),
                _ => None,
            })
            .unwrap();
        assert_eq!(probe.len(), known.len());
    }

    #[test]
    fn plan_phases_are_ordered() {
        let known = known();
        let plan = resolve("myimg:2.0:abc123", &known).unwrap();
        let steps = command_plan(&plan, "reg.example.com/", &known);

        assert!(matches!(steps[0], ScriptStep::InsecureRegistryFix { .. }));
        assert!(matches!(steps[1], ScriptStep::PrePullBase { .. }));
        assert!(matches!(steps[2], ScriptStep::ToolPathSetup));
        assert!(matches!(steps.last().unwrap(), ScriptStep::StalenessProbe { .. }));
    }
}
