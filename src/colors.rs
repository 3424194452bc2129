//! Fluorescent protein to display-color resolution.

/// Protein name (lowercase) to display color, grouped by hue family.
const PROTEIN_VISUAL_COLORS: &[(&str, &str)] = &[
    // Reds / Pinks
    ("mrfp1", "red"),
    ("mcherry", "firebrick"),
    ("dsred", "darkred"),
    ("mruby2", "crimson"),
    ("mscarlet_i", "tomato"),
    ("mkate2", "deeppink"),
    ("mkate2_tf", "mediumvioletred"),
    ("tagrfp", "coral"),
    ("tdtomato", "orangered"),
    ("eqfp578", "salmon"),
    ("mlychee_tf", "hotpink"),
    ("mwatermelon", "lightcoral"),
    // Oranges / Yellows
    ("mko2", "orange"),
    ("mpapaya", "lightsalmon"),
    ("venus", "yellow"),
    ("mcitrine", "gold"),
    ("mvenus", "goldenrod"),
    ("mbanana", "khaki"),
    ("mstaygold2", "gold"),
    ("mchartreuse_tf", "chartreuse"),
    // Greens
    ("sfgfp", "lime"),
    ("egfp", "lime"),
    ("megfp", "limegreen"),
    ("avgfp", "palegreen"),
    ("mneongreen", "greenyellow"),
    ("mazamigreen", "forestgreen"),
    ("mclover3", "green"),
    ("mwasabi", "lightgreen"),
    ("mjuniper", "darkgreen"),
    ("zsgreen1", "springgreen"),
    ("pa_gfp", "mediumseagreen"),
    ("mhoneydew", "yellowgreen"),
    // Blues / Cyans
    ("azurite", "royalblue"),
    ("tagbfp", "blue"),
    ("mtagbfp2", "mediumblue"),
    ("ultramarine", "navy"),
    ("mturquoise2", "turquoise"),
    ("mcerulean3", "cyan"),
    ("mtfp1", "darkcyan"),
    ("mmicy", "aquamarine"),
    ("electra2", "deepskyblue"),
    // Others
    ("mplum", "purple"),
];

/// Resolves a fluorescent protein name or color name to a display color
/// token.
///
/// Lookup order: the protein table (case-insensitive), then a `green` to
/// `lime` remap for visibility on dark agar, then passthrough (the name is
/// assumed to already be a valid display color).
pub fn resolve_visual_color(protein_or_color: &str) -> String {
    let key = protein_or_color.trim().to_lowercase();
    if let Some((_, color)) = PROTEIN_VISUAL_COLORS.iter().find(|(name, _)| *name == key) {
        return (*color).to_string();
    }
    if key == "green" {
        return "lime".to_string();
    }
    protein_or_color.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_proteins_case_insensitively() {
        assert_eq!(resolve_visual_color("sfGFP"), "lime");
        assert_eq!(resolve_visual_color("MRFP1"), "red");
        assert_eq!(resolve_visual_color("  Azurite "), "royalblue");
    }

    #[test]
    fn green_maps_to_lime() {
        assert_eq!(resolve_visual_color("green"), "lime");
        assert_eq!(resolve_visual_color("Green"), "lime");
    }

    #[test]
    fn unknown_names_pass_through_unchanged() {
        assert_eq!(resolve_visual_color("magenta"), "magenta");
        assert_eq!(resolve_visual_color("#d7ca95"), "#d7ca95");
    }
}
