//! Typed remote command plan and its shell renderer.
//!
//! The plan captures what must happen in what order; `render` is the
//! single place that turns it into the script delivered over SSH.
//! Build and push blocks are strict internally (`set -e`), while the
//! boundaries between steps stay lenient so one step's failure does
//! not prevent later independent steps.

use crate::utils::shell;

/// Image build variants produced for every image.
pub const VARIANTS: [&str; 2] = ["centos7", "rhel7"];

/// Public registry that receives the centos7 `latest` tag.
pub const SECONDARY_REGISTRY: &str = "docker.io/";

/// Remote working directory for image checkouts.
pub const REMOTE_IMAGE_DIR: &str = "/tmp/images";

/// Remote results file for the staleness probe.
pub const LATEST_IMAGES_FILE: &str = "~/latest_images";

const STI_PATH: &str = "/data/src/github.com/openshift/source-to-image/_output/go/bin:\
/data/src/github.com/openshift/source-to-image/_output/local/go/bin";

#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Configure the container engine to trust the registry as
    /// insecure and restart it. Temporary provisioning workaround -
    /// the machine image should eventually ship with this baked in.
    InsecureRegistryFix { registry: String },
    /// Pull base images from the registry and, on success only,
    /// re-tag them under their canonical local names.
    PrePullBase { registry: String },
    /// Put the source-to-image build tooling on PATH.
    ToolPathSetup,
    /// Fetch one image's source at a ref and run its test target for
    /// every variant, tagging on success.
    BuildImage {
        name: String,
        version: String,
        git_ref: String,
        repo_url: String,
    },
    /// Tag and push one image's artifacts in two parallel groups.
    PushImage {
        name: String,
        git_ref: String,
        registry: String,
    },
    /// For every known image, check whether the registry already has
    /// a tag for the latest upstream commit; record the ones it lacks.
    StalenessProbe {
        registry: String,
        images: Vec<(String, String)>,
    },
}

/// One push destination. Two targets collide when they share
/// `(registry, repository)` - those must never sit in the same group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    pub registry: String,
    pub repository: String,
    pub tag: String,
}

impl PushTarget {
    fn new(registry: &str, repository: String, tag: &str) -> Self {
        Self {
            registry: registry.to_string(),
            repository,
            tag: tag.to_string(),
        }
    }

    pub fn destination(&self) -> (&str, &str) {
        (&self.registry, &self.repository)
    }

    fn command(&self) -> String {
        format!("docker push -f {}{}:{}", self.registry, self.repository, self.tag)
    }
}

/// The two sequential groups of parallel pushes for one image.
///
/// Docker fails when two pushes hit the same repository at once (even
/// with different tags), so the `latest` tags for the primary registry
/// wait for the commit-ref pushes of the same repositories.
pub fn push_groups(name: &str, registry: &str) -> [Vec<PushTarget>; 2] {
    let centos = format!("{}-{}", name, VARIANTS[0]);
    let rhel = format!("{}-{}", name, VARIANTS[1]);

    [
        vec![
            PushTarget::new(registry, centos.clone(), "$git_ref"),
            PushTarget::new(SECONDARY_REGISTRY, centos.clone(), "latest"),
            PushTarget::new(registry, rhel.clone(), "$git_ref"),
        ],
        vec![
            PushTarget::new(registry, centos, "latest"),
            PushTarget::new(registry, rhel, "latest"),
        ],
    ]
}

/// Render the whole plan into one shell script.
pub fn render(steps: &[ScriptStep]) -> String {
    steps.iter().map(render_step).collect()
}

fn render_step(step: &ScriptStep) -> String {
    match step {
        ScriptStep::InsecureRegistryFix { registry } => {
            // docker rejects a trailing slash on --insecure-registry
            let host = registry.trim_end_matches('/');
            format!(
                "\nsudo cat <<EOF > /etc/sysconfig/docker\n\
                 OPTIONS='--insecure-registry {host} --selinux-enabled'\n\
                 EOF\n\
                 sudo systemctl restart docker\n"
            )
        }
        ScriptStep::PrePullBase { registry } => {
            let mut block = String::from("\nset -x\nset +e\necho \"Pre-pulling base images ...\"\n");
            for variant in VARIANTS {
                block.push_str(&format!(
                    "docker pull {registry}openshift/base-{variant}\n\
                     [[ \"$?\" == \"0\" ]] && docker tag -f {registry}openshift/base-{variant} openshift/base-{variant}\n"
                ));
            }
            block
        }
        ScriptStep::ToolPathSetup => {
            format!("\n# so we can call sti\nPATH={STI_PATH}:$PATH\n")
        }
        ScriptStep::BuildImage {
            name,
            version,
            git_ref,
            repo_url,
        } => render_build(name, version, git_ref, repo_url),
        ScriptStep::PushImage {
            name,
            git_ref,
            registry,
        } => render_push(name, git_ref, registry),
        ScriptStep::StalenessProbe { registry, images } => render_probe(registry, images),
    }
}

fn render_build(name: &str, version: &str, git_ref: &str, repo_url: &str) -> String {
    let git_ref = shell::quote_arg(git_ref);
    let version = shell::quote_arg(version);

    let mut block = format!(
        "\ndest_dir={REMOTE_IMAGE_DIR}/{name}\n\
         rm -rf ${{dest_dir}}; mkdir -p ${{dest_dir}}\n\
         set -e\n\
         pushd ${{dest_dir}}\n\
         git init && git remote add -t master origin {repo_url}\n\
         git fetch && git checkout {git_ref}\n\
         git_ref=$(git rev-parse --short HEAD)\n"
    );

    for variant in VARIANTS {
        block.push_str(&format!(
            "echo \"Building and testing {name}-{variant}:$git_ref ...\"\n\
             sudo make test TARGET={variant} VERSION={version} TAG_ON_SUCCESS=true\n"
        ));
    }

    block.push_str("popd\nset +e\n");
    block
}

fn render_push(name: &str, git_ref: &str, registry: &str) -> String {
    let checkout_ref = shell::quote_arg(git_ref);
    let groups = push_groups(name, registry);

    let mut block = format!(
        "\nset -e\n\
         pushd {REMOTE_IMAGE_DIR}/{name}\n\
         git checkout {checkout_ref}\n\
         git_ref=$(git rev-parse --short HEAD)\n\
         echo \"Pushing image {name}:$git_ref...\"\n\n"
    );

    for target in groups.iter().flatten() {
        block.push_str(&format!(
            "docker tag -f {} {}{}:{}\n",
            target.repository, target.registry, target.repository, target.tag
        ));
    }

    for group in &groups {
        block.push_str(&render_push_group(group));
    }

    block.push_str("\npopd\nset +e\n");
    block
}

fn render_push_group(group: &[PushTarget]) -> String {
    let mut block = String::from("\npids=()\n");
    for (i, target) in group.iter().enumerate() {
        block.push_str(&format!("procs[{}]=\"{}\"\n", i, target.command()));
    }

    block.push_str(&format!(
        "\n# Run pushes in parallel\n\
         for i in {{0..{last}}}; do\n\
         \x20 echo \"pushing ${{procs[${{i}}]}}\"\n\
         \x20 ${{procs[${{i}}]}} &\n\
         \x20 pids[${{i}}]=$!\n\
         \x20 echo \"push ${{procs[${{i}}]}} is pid ${{pids[${{i}}]}}\"\n\
         done\n\n\
         # Wait for all pushes. \"wait\" will check the return code of each process also.\n\
         for pid in ${{pids[*]}}; do\n\
         \x20 echo \"checking $pid\"\n\
         \x20 wait $pid\n\
         done\n",
        last = group.len() - 1
    ));

    block
}

fn render_probe(registry: &str, images: &[(String, String)]) -> String {
    let mut block = format!(
        "\nrm -rf {LATEST_IMAGES_FILE} ; touch {LATEST_IMAGES_FILE}\n"
    );

    for (name, git_url) in images {
        block.push_str(&format!(
            "\nset +e\n\
             git_ref=$(git ls-remote {git_url} -h refs/heads/master | cut -c1-7)\n\
             curl -s http://{registry}v1/repositories/{name}-rhel7/tags/${{git_ref}} | grep -q \"error\"\n\
             if [[ \"$?\" != \"0\" ]]; then\n\
             \x20 echo \"{name};$git_ref\" >> {LATEST_IMAGES_FILE}\n\
             fi\n"
        ));
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn no_push_group_targets_the_same_repository_twice() {
        let groups = push_groups("openshift/ruby-20", "registry.example.com:5000/");
        for group in &groups {
            let destinations: HashSet<(&str, &str)> =
                group.iter().map(|t| t.destination()).collect();
            assert_eq!(
                destinations.len(),
                group.len(),
                "duplicate destination within a group"
            );
        }
    }

    #[test]
    fn group_sizes_and_secondary_registry_placement() {
        let groups = push_groups("openshift/base", "reg.example.com/");
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].len(), 2);

        // docker.io only receives the centos7 latest tag, in group 1
        assert!(groups[0].iter().any(|t| t.registry == SECONDARY_REGISTRY));
        assert!(groups[1].iter().all(|t| t.registry == "reg.example.com/"));
    }

    #[test]
    fn same_repository_split_across_groups_by_tag() {
        let groups = push_groups("openshift/base", "reg.example.com/");
        let in_group1 = groups[0]
            .iter()
            .find(|t| t.repository == "openshift/base-centos7" && t.registry == "reg.example.com/")
            .unwrap();
        let in_group2 = groups[1]
            .iter()
            .find(|t| t.repository == "openshift/base-centos7")
            .unwrap();
        assert_eq!(in_group1.tag, "$git_ref");
        assert_eq!(in_group2.tag, "latest");
    }

    #[test]
    fn build_block_is_strict_and_covers_both_variants() {
        let block = render_build(
            "openshift/ruby-20",
            "2.0",
            "v2.0.1",
            "https://github.com/openshift/sti-ruby",
        );
        assert!(block.contains("set -e"));
        assert!(block.contains("set +e"));
        assert!(block.contains("rm -rf ${dest_dir}; mkdir -p ${dest_dir}"));
        assert!(block.contains("git remote add -t master origin https://github.com/openshift/sti-ruby"));
        assert!(block.contains("sudo make test TARGET=centos7 VERSION=2.0 TAG_ON_SUCCESS=true"));
        assert!(block.contains("sudo make test TARGET=rhel7 VERSION=2.0 TAG_ON_SUCCESS=true"));
    }

    #[test]
    fn push_group_waits_on_every_tracked_pid() {
        let groups = push_groups("openshift/base", "reg.example.com/");
        let block = render_push_group(&groups[0]);

        assert!(block.contains("pids=()"));
        assert!(block.contains("for i in {0..2}; do"));
        assert!(block.contains("pids[${i}]=$!"));
        assert!(block.contains("for pid in ${pids[*]}; do"));
        assert!(block.contains("wait $pid"));
    }

    #[test]
    fn push_block_tags_before_pushing() {
        let block = render_push("openshift/base", "master", "reg.example.com/");
        let first_tag = block.find("docker tag -f").unwrap();
        let first_push = block.find("docker push -f").unwrap();
        assert!(first_tag < first_push);

        // five tags: centos7 ref/latest/docker.io-latest, rhel7 ref/latest
        assert_eq!(block.matches("docker tag -f").count(), 5);
        assert!(block.contains("docker tag -f openshift/base-centos7 docker.io/openshift/base-centos7:latest"));
    }

    #[test]
    fn insecure_registry_fix_strips_trailing_slash() {
        let block = render_step(&ScriptStep::InsecureRegistryFix {
            registry: "reg.example.com:5000/".to_string(),
        });
        assert!(block.contains("--insecure-registry reg.example.com:5000 "));
        assert!(block.contains("sudo systemctl restart docker"));
    }

    #[test]
    fn probe_truncates_results_file_and_records_missing_tags() {
        let block = render_probe(
            "reg.example.com/",
            &[(
                "openshift/base".to_string(),
                "https://github.com/openshift/sti-base".to_string(),
            )],
        );
        assert!(block.contains("rm -rf ~/latest_images ; touch ~/latest_images"));
        assert!(block.contains("git ls-remote https://github.com/openshift/sti-base -h refs/heads/master"));
        assert!(block.contains("curl -s http://reg.example.com/v1/repositories/openshift/base-rhel7/tags/${git_ref}"));
        assert!(block.contains("echo \"openshift/base;$git_ref\" >> ~/latest_images"));
    }
}
