//! Image recipe generation, build-context preparation, and eject for imgship.
//!
//! # Publish pipeline
//!
//! ```text
//! imgship
//!   1. Build  ── BuildContext::prepare_recipe() → docker build -f <recipe> -t <local> <context>
//!   2. Tag    ── docker tag <local> <host:port/name:tag>
//!   3. Push   ── docker push <host:port/name:tag>
//!   4. Notify ── completion message
//! ```
//!
//! # Recipe source
//!
//! - **Project `Dockerfile` present** (hand-written or ejected): used as-is.
//! - **Otherwise**: rendered by [`RecipeGenerator`] from `[recipe]` and written
//!   to `.imgship/Dockerfile` inside the build context.
//!
//! The build context is the project directory, copied verbatim (`COPY . .`).

pub mod context;
pub mod eject;
pub mod recipe;

pub use context::{BuildContext, ContextError, PreparedRecipe, RecipeSource};
pub use recipe::{RecipeError, RecipeGenerator, RecipeSummary};
