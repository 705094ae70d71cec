use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

#[test]
fn test_controller_signature() {
    let content = "<?php class UserController extends Controller { }";
    assert_eq!(classify(content, "User"), Role::Controller);
}

#[test]
fn test_controller_wins_over_config_by_priority() {
    // Matches both the controller battery and the looser config battery
    let content = "<?php class FooController extends Controller { } // config";
    assert_eq!(classify(content, "Foo"), Role::Controller);
}

#[test]
fn test_model_signature() {
    let content = "<?php class User { protected $table = 'users'; }";
    assert_eq!(classify(content, "User"), Role::Model);
}

#[test]
fn test_filename_keyword_fallback() {
    assert_eq!(classify("<?php ", "UserModel"), Role::Model);
    assert_eq!(classify("<?php ", "api_routes"), Role::Route);
    assert_eq!(classify("<?php ", "AuthMiddleware"), Role::Middleware);
}

#[test]
fn test_default_is_util() {
    assert_eq!(classify("<?php $x = 1;", "helpers"), Role::Util);
}

#[test]
fn test_classification_is_idempotent() {
    let content = "<?php Route::get('/users', 'UserController@index');";
    let first = classify(content, "web");
    let second = classify(content, "web");
    assert_eq!(first, second);
}

#[test]
fn test_route_mapping_uses_kebab_case() {
    let mapping = map_php_to_node_structure(
        Path::new("/proj/src/ApiRoutes.php"),
        "<?php Route::get('/x', 'C@a');",
    );
    assert_eq!(mapping.role, Role::Route);
    assert_eq!(mapping.new_path, Path::new("routes/api-routes.ts"));
}

#[test]
fn test_util_mapping_uses_camel_case() {
    let mapping = map_php_to_node_structure(
        Path::new("/proj/src/string_helpers.php"),
        "<?php $x = 1;",
    );
    assert_eq!(mapping.role, Role::Util);
    assert_eq!(mapping.new_path, Path::new("utils/stringHelpers.ts"));
}

#[test]
fn test_same_base_name_different_roles_do_not_collide() {
    let controller = map_php_to_node_structure(
        Path::new("/proj/app/User.php"),
        "<?php class UserController extends Controller { }",
    );
    let model = map_php_to_node_structure(
        Path::new("/proj/db/User.php"),
        "<?php class User { protected $fillable = []; }",
    );
    assert_ne!(controller.new_path, model.new_path);
}

#[test]
fn test_case_conversions() {
    assert_eq!(to_camel_case("user_controller"), "userController");
    assert_eq!(to_camel_case("my-helper file"), "myHelperFile");
    assert_eq!(to_camel_case("plain"), "plain");
    assert_eq!(to_kebab_case("ApiRoutes"), "api-routes");
    assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
}

#[tokio::test]
async fn test_create_project_structure_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let project_dir = tmp.path().join("proj1");
    tokio::fs::create_dir_all(&project_dir).await.unwrap();

    let generator = StructureGenerator::new(tmp.path());
    generator.create_project_structure("proj1").await.unwrap();
    generator.create_project_structure("proj1").await.unwrap();

    let converted = generator.converted_dir("proj1");
    for folder in [
        "controllers",
        "models",
        "routes",
        "middlewares",
        "config",
        "utils",
        "types",
        "services",
    ] {
        assert!(converted.join(folder).is_dir(), "missing folder {folder}");
    }
    assert!(converted.join("index.ts").is_file());
    assert!(converted.join("package.json").is_file());
    let database = tokio::fs::read_to_string(converted.join("config/database.ts"))
        .await
        .unwrap();
    assert!(database.contains("mongoose.connect(MONGODB_URI)"));
}

#[tokio::test]
async fn test_structure_fails_for_missing_project() {
    let tmp = TempDir::new().unwrap();
    let generator = StructureGenerator::new(tmp.path());
    let err = generator.create_project_structure("absent").await.unwrap_err();
    assert!(matches!(err, crate::ConvertError::Project(_)));
}
