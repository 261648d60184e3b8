//! Built-in prompts: the system prompt and the random UI ideas.

use rand::seq::SliceRandom;

/// System prompt sent ahead of every user prompt.
pub const SYSTEM_PROMPT: &str = "You are an expert web developer and UI/UX designer. \
Create a complete, beautiful HTML page based on the user's request.

Requirements:
- Create a single HTML file with embedded CSS and JavaScript
- Use modern CSS features (flexbox, grid, animations, gradients)
- Make it fully responsive and mobile-friendly
- Include interactive elements and hover effects
- Use beautiful color schemes and typography
- Add subtle animations and transitions
- Use CDN links for any external resources (fonts, icons)
- Ensure the design is visually striking and professional
- Include proper semantic HTML structure
- Make it accessible with proper contrast and ARIA labels
- Return ONLY the complete HTML code, no explanations or markdown

The page should be production-ready and visually impressive!";

/// UI ideas used by `GET /` and `GET /api/random-prompt`.
pub const UI_PROMPTS: &[&str] = &[
    "Create a beautiful landing page for a coffee shop with warm colors and cozy atmosphere",
    "Design a modern portfolio website for a photographer with stunning gallery layout",
    "Build a sleek dashboard interface for a fitness tracking app with charts and metrics",
    "Create a minimalist blog homepage with dark theme and elegant typography",
    "Design a product showcase page for eco-friendly products with green theme",
    "Build a creative agency homepage with bold typography and animated elements",
    "Create a weather app interface with animated weather icons and gradients",
    "Design a music player interface with vinyl record aesthetic and controls",
    "Build a cryptocurrency dashboard with real-time charts and modern design",
    "Create a food delivery app interface with appetizing food images",
    "Design a travel booking website with beautiful destination photos",
    "Build a social media dashboard with card-based layout and interactions",
    "Create a gaming website with neon colors and futuristic design",
    "Design a meditation app interface with calming colors and zen elements",
    "Build a real estate website with property listings and modern layout",
];

/// Picks one of [`UI_PROMPTS`] uniformly at random.
#[must_use]
pub fn random_prompt() -> &'static str {
    UI_PROMPTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_has_fifteen_prompts() {
        assert_eq!(UI_PROMPTS.len(), 15);
        assert!(UI_PROMPTS.iter().all(|p| !p.trim().is_empty()));
    }

    #[test]
    fn random_prompt_comes_from_library() {
        for _ in 0..30 {
            assert!(UI_PROMPTS.contains(&random_prompt()));
        }
    }

    #[test]
    fn system_prompt_demands_bare_html() {
        assert!(SYSTEM_PROMPT.contains("Return ONLY the complete HTML code"));
    }
}
