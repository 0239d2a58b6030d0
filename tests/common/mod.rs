//! Shared utilities for integration testing.

use pathmark::{match_request, Method, MethodSet, Route, RoutingTable};

/// A representative route mix: literals, typed and untyped variables,
/// shared literal paths, a demoted literal, and an any-method route.
pub fn demo_routes() -> Vec<Route> {
    vec![
        Route::new(MethodSet::of([Method::Get]), "/", "home"),
        Route::new(MethodSet::of([Method::Get]), "/about", "about"),
        Route::new(MethodSet::of([Method::Get]), "/ping", "ping.get"),
        Route::new(MethodSet::of([Method::Post]), "/ping", "ping.post"),
        Route::new(MethodSet::of([Method::Get]), "/users/{id:num}", "users.show"),
        Route::new(MethodSet::of([Method::Post]), "/users/{id:num}", "users.update"),
        Route::new(MethodSet::of([Method::Get]), "/users/{id:num}/posts/{slug}", "users.post"),
        Route::new(MethodSet::of([Method::Get]), "/files/{path:all}", "files.get"),
        // Literal declared after the pattern that matches it: demoted.
        Route::new(MethodSet::of([Method::Get]), "/files/readme", "files.readme"),
        Route::new(MethodSet::of([Method::Get]), "/export/{name}.{format}", "export"),
        Route::new(MethodSet::any(), "/webhook/{source}", "webhook"),
    ]
}

/// Paths that exercise every tier and failure mode of the demo routes.
pub fn sample_paths() -> Vec<&'static str> {
    vec![
        "/",
        "/about",
        "/ping",
        "/users/42",
        "/users/42/",
        "/users/abc",
        "/users/42/posts/hello-world",
        "/files/a/b/c.txt",
        "/files/readme",
        "/export/report.csv",
        "/webhook/github",
        "/nope",
        "/users",
    ]
}

/// Every method crossed with every sample path, as canonical outcome
/// strings (variables sorted, so two tables compare structurally).
pub fn observable_outcomes(table: &RoutingTable) -> Vec<String> {
    let methods = [Method::Get, Method::Post, Method::Put, Method::Head];
    let mut outcomes = Vec::new();
    for path in sample_paths() {
        for method in methods {
            let outcome = match match_request(table, path, method) {
                Ok(hit) => {
                    let mut vars: Vec<(String, String)> = hit.variables.into_iter().collect();
                    vars.sort();
                    format!("ok action={} vars={vars:?}", hit.action)
                }
                Err(err) => format!("err {err}"),
            };
            outcomes.push(format!("{method} {path} -> {outcome}"));
        }
    }
    outcomes
}
