//! Absolute URLs for named routes.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use url::Url;

use crate::api::route_table::RouteTable;

/// Builds an absolute URL for a named operation.
///
/// Parameters whose name matches a `{placeholder}` in the route path fill that
/// placeholder; the rest become query parameters in the given order.
pub trait LinkGenerator: Send + Sync {
    fn link(&self, operation_id: &str, params: &[(&str, String)]) -> anyhow::Result<String>;
}

/// [`LinkGenerator`] backed by the route table and the public base URL.
#[derive(Clone)]
pub struct RouteLinks {
    base: Url,
    table: Arc<RouteTable>,
}

impl RouteLinks {
    pub fn new(base: Url, table: Arc<RouteTable>) -> Self {
        Self { base, table }
    }

    pub fn parse(base: &str, table: Arc<RouteTable>) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid public URL '{base}'"))?;
        if base.cannot_be_a_base() {
            bail!("public URL '{base}' cannot be used as a base");
        }
        Ok(Self::new(base, table))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

/// Substitute `{name}` placeholders, returning the path and the unused params.
fn expand_template<'a>(
    template: &str,
    params: &'a [(&'a str, String)],
) -> anyhow::Result<(String, Vec<&'a (&'a str, String)>)> {
    let mut used = vec![false; params.len()];
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        path.push_str(&rest[..start]);
        let end = rest[start..]
            .find('}')
            .map(|e| start + e)
            .ok_or_else(|| anyhow!("unterminated placeholder in route '{template}'"))?;
        let name = &rest[start + 1..end];
        let idx = params
            .iter()
            .position(|(k, _)| *k == name)
            .ok_or_else(|| anyhow!("missing value for '{{{name}}}' in route '{template}'"))?;
        used[idx] = true;
        path.push_str(&params[idx].1);
        rest = &rest[end + 1..];
    }
    path.push_str(rest);

    let unused = params
        .iter()
        .zip(used)
        .filter_map(|(p, u)| (!u).then_some(p))
        .collect();
    Ok((path, unused))
}

impl LinkGenerator for RouteLinks {
    fn link(&self, operation_id: &str, params: &[(&str, String)]) -> anyhow::Result<String> {
        let template = self
            .table
            .path_for(operation_id)
            .ok_or_else(|| anyhow!("unknown operation '{operation_id}'"))?;
        let (path, query) = expand_template(&template, params)?;

        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}{path}"));
        url.set_query(None);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::operation_builder::{Missing, OperationBuilder};
    use axum::Router;

    async fn noop() {}

    fn links(base: &str) -> RouteLinks {
        let table = Arc::new(RouteTable::new());
        let router = OperationBuilder::<Missing, ()>::get("/api/users")
            .operation_id("users.list")
            .handler(noop)
            .register(Router::new(), table.as_ref());
        let _ = OperationBuilder::<Missing, ()>::get("/api/users/{id}")
            .operation_id("users.get_user")
            .handler(noop)
            .register(router, table.as_ref());
        RouteLinks::parse(base, table).unwrap()
    }

    #[test]
    fn fills_path_placeholders() {
        let l = links("http://localhost:8087");
        let url = l
            .link("users.get_user", &[("id", "3f1c".to_string())])
            .unwrap();
        assert_eq!(url, "http://localhost:8087/api/users/3f1c");
    }

    #[test]
    fn extra_params_become_query() {
        let l = links("http://localhost:8087/");
        let url = l
            .link(
                "users.list",
                &[("pageNumber", "2".to_string()), ("pageSize", "5".to_string())],
            )
            .unwrap();
        assert_eq!(url, "http://localhost:8087/api/users?pageNumber=2&pageSize=5");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let l = links("https://example.com/svc/");
        let url = l.link("users.list", &[]).unwrap();
        assert_eq!(url, "https://example.com/svc/api/users");
    }

    #[test]
    fn unknown_operation_or_missing_param_fails() {
        let l = links("http://localhost");
        assert!(l.link("users.nope", &[]).is_err());
        assert!(l.link("users.get_user", &[]).is_err());
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(RouteLinks::parse("mailto:someone@example.com", Arc::new(RouteTable::new())).is_err());
        assert!(RouteLinks::parse("not a url", Arc::new(RouteTable::new())).is_err());
    }
}
