use crate::analyzer::{LidarAnalysis, SoilAnalysis};
use crate::lidar::twin::DigitalTwin;
use crate::soil::fertility::FertilityLabel;
use crate::soil::scoring::SoilParameter;

/// Markdown formatter for analysis results
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Soil fertility report with parameter table and action plan
    pub fn format_soil(analysis: &SoilAnalysis) -> String {
        let mut md = String::with_capacity(2048);
        let fertility = &analysis.fertility;

        md.push_str(&format!(
            "# {} Soil Fertility - {}\n\n",
            Self::stars(fertility.label),
            fertility.label.as_str()
        ));
        md.push_str(&format!(
            "**Overall Score:** {:.1}/100  \n**Crop:** {}  \n**Texture:** {}\n\n",
            fertility.overall_score, fertility.crop, analysis.sample.texture
        ));

        if !analysis.warnings.is_empty() {
            md.push_str("## Input Warnings\n\n");
            for w in &analysis.warnings {
                md.push_str(&format!("- ⚠️ {}\n", w));
            }
            md.push('\n');
        }

        md.push_str("## Parameters\n\n");
        md.push_str("| Parameter | Value | Score | Category | Weight |\n");
        md.push_str("|-----------|-------|-------|----------|--------|\n");
        for param in SoilParameter::ALL {
            if let Some(a) = fertility.get(param) {
                let value = match param {
                    SoilParameter::Texture => "-".to_string(),
                    _ => format!("{:.2} {}", a.value, param.unit()).trim_end().to_string(),
                };
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {:.0}% |\n",
                    param.as_str(),
                    value,
                    a.score,
                    a.category,
                    param.weight() * 100.0
                ));
            }
        }
        md.push('\n');

        md.push_str("## Action Plan\n\n");
        for (i, rec) in analysis.recommendations.iter().enumerate() {
            md.push_str(&format!(
                "### {}. {} [{}]\n\n",
                i + 1,
                rec.action_kind.as_str(),
                rec.priority.as_str()
            ));
            md.push_str(&format!("{}\n\n", rec.notes));
            if let Some(dose) = &rec.dosage {
                md.push_str(&format!(
                    "*Dose:* {:.0} {} as {} ({:.1} kg/ha of product)\n\n",
                    dose.amount,
                    dose.unit.as_str(),
                    dose.product.as_str(),
                    dose.product_kg_ha
                ));
            }
        }

        md
    }

    /// Digital twin card
    pub fn format_twin(twin: &DigitalTwin) -> String {
        let mut md = String::with_capacity(1024);
        let m = &twin.metrics;

        md.push_str(&format!("# Digital Twin - {}\n\n", twin.plant_type));
        md.push_str(&format!("*Captured:* {}\n\n", twin.timestamp_iso()));

        md.push_str("## Plant Metrics\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Height | {:.2} m |\n", m.plant_height));
        md.push_str(&format!("| Canopy volume | {:.2} m³ |\n", m.canopy_volume));
        md.push_str(&format!("| Canopy area | {:.2} m² |\n", m.canopy_area));
        md.push_str(&format!("| Points | {} |\n", m.plant_density_count));
        md.push_str(&format!("| Roughness | {:.3} m |\n", m.canopy_roughness));
        md.push_str(&format!(
            "| Height range | {:.2} - {:.2} m (mean {:.2}) |\n",
            m.min_height, m.max_height, m.mean_height
        ));
        md.push_str(&format!("| Health | {:.1}/100 |\n", m.health_score));
        md.push_str(&format!("| Growth stage | {} |\n\n", m.growth_stage.display_text()));

        md.push_str("## Recommendations\n\n");
        for note in &twin.recommendations {
            md.push_str(&format!("- {}\n", note));
        }
        md.push('\n');

        md
    }

    /// Twin card followed by preprocessing and segmentation counts
    pub fn format_lidar(analysis: &LidarAnalysis) -> String {
        let stats = &analysis.preprocessing;
        let seg = &analysis.segmentation;
        let mut md = Self::format_twin(&analysis.twin);

        md.push_str("## Processing\n\n");
        md.push_str(&format!(
            "- Points: {} loaded → {} after downsampling → {} after outlier removal\n",
            stats.input_points, stats.after_downsample, stats.after_outlier_removal
        ));
        md.push_str(&format!(
            "- Normals estimated: {}\n",
            if stats.normals_estimated { "yes" } else { "no" }
        ));
        md.push_str(&format!(
            "- Ground height {:.2} m; {} candidates in {} clusters; {} canopy points kept\n\n",
            seg.ground_z, seg.candidate_count, seg.cluster_count, seg.canopy_points
        ));

        md
    }

    fn stars(label: FertilityLabel) -> &'static str {
        match label {
            FertilityLabel::Excellent => "★★★★",
            FertilityLabel::Good => "★★★☆",
            FertilityLabel::Fair => "★★☆☆",
            FertilityLabel::Poor => "★☆☆☆",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_sample;
    use crate::lidar::metrics::{GrowthStage, PlantMetrics};
    use crate::soil::types::{Crop, SoilSample, Texture};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_soil_markdown() {
        let analysis = analyze_sample(SoilSample {
            ph: 6.5,
            organic_matter_pct: 3.5,
            texture: Texture::Loam,
            nitrogen_ppm: 10.0,
            phosphorus_ppm: 30.0,
            potassium_ppm: 150.0,
            field_capacity_pct: 25.0,
            conductivity_dsm: 1.0,
            crop: Crop::Maize,
            expected_yield_kg_ha: 9000.0,
        });
        let md = MarkdownFormatter::format_soil(&analysis);

        assert!(md.contains("**Crop:** Maize"));
        assert!(md.contains("| Nitrogen | 10.00 ppm | 30 | Very Low | 25% |"));
        assert!(md.contains("### 1. Nitrogen fertilization [High]"));
        assert!(md.contains("*Dose:* 160 kg N/ha as urea (46% N) (347.8 kg/ha of product)"));
    }

    #[test]
    fn test_format_twin_markdown() {
        let metrics = PlantMetrics {
            plant_height: 1.8,
            canopy_volume: 12.0,
            canopy_area: 6.0,
            plant_density_count: 4200,
            canopy_roughness: 0.31,
            max_height: 2.0,
            min_height: 0.2,
            mean_height: 1.1,
            health_score: 64.0,
            growth_stage: GrowthStage::Flowering,
        };
        let ts = Utc.with_ymd_and_hms(2024, 7, 15, 8, 0, 0).unwrap();
        let md = MarkdownFormatter::format_twin(&DigitalTwin::at("sunflower", metrics, ts));

        assert!(md.starts_with("# Digital Twin - sunflower"));
        assert!(md.contains("2024-07-15T08:00:00Z"));
        assert!(md.contains("| Growth stage | Flowering |"));
        assert!(md.contains("- Moderate vigour: monitor development"));
    }
}
