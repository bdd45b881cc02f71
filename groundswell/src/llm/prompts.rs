//! Prompt text and tool definitions for newsletter synthesis.

use serde_json::{json, Value};

use crate::error::Result;
use crate::search::RegionSearchResults;

/// Name of the local search function exposed to the assistant.
pub const SEARCH_TOOL_NAME: &str = "search_web";

/// Region used when a request names none.
pub const DEFAULT_REGION: &str = "Global";

/// Seed queries used when a request supplies none.
pub const DEFAULT_QUERIES: [&str; 5] = [
    "campaign victory justice",
    "campaign win protest",
    "government protest victory",
    "community organizing success",
    "Rights win protest",
];

/// System instructions for both synthesis strategies: research grassroots
/// movement wins and report them in a region-organized newsletter.
pub const NEWSLETTER_INSTRUCTIONS: &str = "\
You are an expert web researcher that identifies the successes of grassroots \
social movements, searches for related social media activity, and provides a \
newsletter with the results.

When you find a success story, ALWAYS use the search_web function to search \
for social media activity before including it in your report.

You will receive search results organized by region. For each region's \
success stories:
1. Extract key details:
   - Region and location specifics
   - Campaign name and objectives
   - Specific victories or outcomes achieved
   - Organizations and key people involved

2. For each story, construct and perform Twitter-specific searches using \
\"site:x.com\" and your search function.

3. Synthesize all information into a clear newsletter format organized by \
region:
   ### [Region Name]
   - Campaign details and direct impact
   - Names/roles of key organizers and spokespeople
   - Direct quotes from news sources and social media
   - Official Twitter/X handles and relevant hashtags if found
   - Coalition partners involved

Focus on local/regional victories that demonstrate community organizing \
impact.
Exclude organizations with significant international media coverage.

If a region has no relevant results, skip it in the final report.";

pub fn default_queries() -> Vec<String> {
    DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect()
}

/// Function-tool definition for the assistant strategy.
pub fn search_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": SEARCH_TOOL_NAME,
            "description": "Search the web for Twitter/X activity on each story",
            "parameters": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to perform. Use site:x.com for Twitter/X specific searches."
                    }
                },
                "required": ["query"]
            }
        }
    })
}

/// User message for the assistant strategy: pre-fetched region search
/// results plus the submitted question.
pub fn build_research_message(
    results: &[RegionSearchResults],
    message: &str,
) -> Result<String> {
    let results_json = serde_json::to_string_pretty(results)?;

    Ok(format!(
        "Analyze these region-specific search results and find relevant social \
movement successes. Then find related social media activity for each success \
story.\n\n\
Search Results:\n{results_json}\n\n\
User question or context:\n{message}\n\n\
Organize your response by region, including only regions where relevant \
successes were found."
    ))
}

/// User prompt for the grounding strategy. No pre-fetched results: the model
/// performs its own searches.
pub fn build_grounded_prompt(regions: &[String], message: &str) -> String {
    format!(
        "Research recent grassroots social movement successes in the following \
regions: {}.\n\n\
User question or context:\n{message}\n\n\
Organize your response by region, including only regions where relevant \
successes were found.",
        regions.join(", ")
    )
}
