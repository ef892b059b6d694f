use studio_common::related;
use uuid::Uuid;

use crate::deps::StudioDeps;
use crate::error::Result;
use crate::showcase::models::{CaseStudy, PortfolioProject};

/// Projects related to `project_id`, technologies standing in for tags.
pub async fn related_projects(
    project_id: Uuid,
    limit: Option<usize>,
    deps: &StudioDeps,
) -> Result<Vec<PortfolioProject>> {
    let ranking = deps.ranking();
    let limit = limit.unwrap_or(ranking.default_limit);
    let project = PortfolioProject::find_by_id(project_id, deps.pool()).await?;
    let candidates =
        PortfolioProject::ranking_pool(&project, ranking.candidate_pool_size.max(limit), deps.pool()).await?;
    Ok(related(&project, &candidates, limit).into_iter().cloned().collect())
}

pub async fn related_case_studies(
    study_id: Uuid,
    limit: Option<usize>,
    deps: &StudioDeps,
) -> Result<Vec<CaseStudy>> {
    let ranking = deps.ranking();
    let limit = limit.unwrap_or(ranking.default_limit);
    let study = CaseStudy::find_by_id(study_id, deps.pool()).await?;
    let candidates =
        CaseStudy::ranking_pool(&study, ranking.candidate_pool_size.max(limit), deps.pool()).await?;
    Ok(related(&study, &candidates, limit).into_iter().cloned().collect())
}
