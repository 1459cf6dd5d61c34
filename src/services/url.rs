/// Builds links to pages of the public site
#[derive(Debug, Clone)]
pub struct UrlService {
    base_url: String,
}

impl UrlService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Fully qualified link to a project's page
    pub fn project_url(&self, project_id: i32) -> String {
        format!("{}/project/view/{}", self.base_url, project_id)
    }
}
