pub mod cgp_somatic;
