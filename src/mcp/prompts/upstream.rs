//! Prompt for setting up an upstream development checkout next to dist-git.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::{PromptMessage, PromptMessageRole},
    prompt, prompt_router, schemars,
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};

use crate::mcp::McpServer;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetupUpstreamDevArgs {
    #[schemars(description = "Directory holding dist-git checkouts")]
    pub dist_git_path: String,
    #[schemars(description = "Source package name")]
    pub package_name: String,
    #[schemars(description = "dist-git branch, e.g. 'c10s'")]
    pub branch: String,
}

#[prompt_router(router = "upstream_prompt_router", vis = "pub(crate)")]
impl McpServer {
    #[prompt(
        name = "setup_upstream_dev",
        description = "Step-by-step instructions to set up an upstream development checkout for a package, with the downstream patches applied on a distgit branch"
    )]
    pub async fn setup_upstream_dev(
        &self,
        params: Parameters<SetupUpstreamDevArgs>,
    ) -> Vec<PromptMessage> {
        vec![PromptMessage::new_text(
            PromptMessageRole::User,
            upstream_dev_instructions(&params.0),
        )]
    }
}

/// Instruction text for [`McpServer::setup_upstream_dev`].
pub fn upstream_dev_instructions(args: &SetupUpstreamDevArgs) -> String {
    let SetupUpstreamDevArgs {
        dist_git_path,
        package_name,
        branch,
    } = args;
    let checkout = format!("{}/{}", dist_git_path.trim_end_matches('/'), package_name);

    format!(
        "You are helping to set up the upstream development environment for the \
package {package_name}.

The dist-git checkouts live in {dist_git_path}. Run the following steps in order.

1. Check whether the dist-git repository exists at {checkout}. If it does not,
clone it to that location. Then pull the latest changes for the {branch} branch
from the \"origin\" remote.

2. Determine the upstream URL of the project with the get_upstream_url tool of
the hrungnir MCP server, passing it the spec file of the dist-git repository.

3. Clone the upstream repository to {checkout}/upstream.

4. In the upstream repository, create a branch named distgit-{branch} unless it
already exists. If it exists and the working tree has no uncommitted changes,
switch to it. Base the branch on the version packaged in the spec file, then
apply every patch from the dist-git repository individually, keeping the patch
metadata. Prefer `git am` to apply the patches.
"
    )
}
