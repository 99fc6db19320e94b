//! OpenAPI Documentation
//!
//! Aggregates all API endpoints into a single OpenAPI document.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use sr_common::{
    DivisionDto, DivisionRequest, EntryDto, EntryRequest, LoginRequest, LoginResponse,
    RefreshRequest, RegisterRequest, ResultDto, ResultRequest, RoleDto, RoleUserCount, ShowClassDto,
    ShowClassRequest, ShowDto, ShowRequest, UserDto, UserInfo, UserModelObjectDto,
    UserModelObjectRequest,
};

use super::common::{ApiError, CreatedResponse, SuccessResponse};

/// Registers the `bearer_auth` scheme referenced by protected operations.
struct BearerAuthAddon;

impl Modify for BearerAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Showring Platform API",
        version = "1.0.0",
        description = "REST API for model horse show management: shows, divisions, classes, entries, results and accounts"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&BearerAuthAddon),
    tags(
        (name = "identity", description = "Registration, login and token refresh"),
        (name = "shows", description = "Show management"),
        (name = "show-holder", description = "Shows owned by the calling show holder"),
        (name = "divisions", description = "Divisions within a show"),
        (name = "show-classes", description = "Classes within a division"),
        (name = "entries", description = "Horse entries into classes"),
        (name = "results", description = "Judged results"),
        (name = "user-model-objects", description = "Competitors' model horses"),
        (name = "roles", description = "Role administration"),
        (name = "users", description = "User administration")
    ),
    paths(
        // Identity
        super::identity::register,
        super::identity::login,
        super::identity::refresh,
        super::identity::logout,
        super::identity::me,
        // Shows
        super::shows::list_shows,
        super::shows::get_show,
        super::shows::list_shows_by_judge,
        super::shows::create_show,
        super::shows::update_show,
        super::shows::delete_show,
        // Show holder
        super::show_holder::my_shows,
        super::show_holder::create_my_show,
        super::show_holder::update_my_show,
        super::show_holder::delete_my_show,
        // Divisions
        super::divisions::list_divisions,
        super::divisions::get_division,
        super::divisions::create_division,
        super::divisions::update_division,
        super::divisions::delete_division,
        // Classes
        super::show_classes::list_show_classes,
        super::show_classes::get_show_class,
        super::show_classes::create_show_class,
        super::show_classes::update_show_class,
        super::show_classes::delete_show_class,
        // Entries
        super::entries::list_entries,
        super::entries::get_entry,
        super::entries::create_entry,
        super::entries::update_entry,
        super::entries::delete_entry,
        // Results
        super::results::get_result,
        super::results::get_result_for_entry,
        super::results::create_result,
        super::results::update_result,
        super::results::delete_result,
        // Model horses
        super::user_model_objects::list_user_model_objects,
        super::user_model_objects::get_user_model_object,
        super::user_model_objects::create_user_model_object,
        super::user_model_objects::update_user_model_object,
        super::user_model_objects::delete_user_model_object,
        // Roles
        super::roles::list_roles,
        super::roles::create_role,
        super::roles::rename_role,
        super::roles::delete_role,
        super::roles::count_users_in_role,
        // Users
        super::users::list_users,
        super::users::get_user,
        super::users::get_user_by_email,
        super::users::get_user_roles,
        super::users::add_user_role,
        super::users::remove_user_role,
    ),
    components(
        schemas(
            LoginRequest,
            RegisterRequest,
            RefreshRequest,
            LoginResponse,
            UserInfo,
            UserDto,
            RoleDto,
            RoleUserCount,
            ShowDto,
            ShowRequest,
            DivisionDto,
            DivisionRequest,
            ShowClassDto,
            ShowClassRequest,
            EntryDto,
            EntryRequest,
            ResultDto,
            ResultRequest,
            UserModelObjectDto,
            UserModelObjectRequest,
            ApiError,
            CreatedResponse,
            SuccessResponse,
        )
    )
)]
pub struct PlatformApiDoc;
