use anyhow::Result;

use echocal::model::SonarModel;

/// Print one line per registry entry
pub fn run() -> Result<()> {
    println!("Supported sonar models:");
    for model in SonarModel::ALL {
        println!("  {}", model.descriptor());
    }
    Ok(())
}
