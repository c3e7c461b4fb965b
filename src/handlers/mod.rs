// Route handlers under /api/workspace, grouped by the entity addressed in
// the path. Every protected handler receives the AuthUser inserted by
// middleware::auth and hands the user id to WorkspaceService.
pub mod pages;
pub mod projects;
pub mod tabs;
pub mod workspace;
