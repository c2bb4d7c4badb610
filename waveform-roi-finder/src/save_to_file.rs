use roi_common::{Channel, Sample, Tick};
use std::{
    fs::File,
    io::{BufWriter, Error, Write},
    path::{Path, PathBuf},
};

pub(crate) trait SavablePoint {
    fn write_to_file<W: Write>(&self, file: &mut W) -> Result<(), Error>;
}

impl SavablePoint for (Tick, Sample) {
    fn write_to_file<W: Write>(&self, file: &mut W) -> Result<(), Error> {
        writeln!(file, "{0},{1}", self.0, self.1)
    }
}

pub(crate) trait SaveToFileFilter<I>
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error>;
}

impl<I> SaveToFileFilter<I> for I
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path) -> Result<(), Error> {
        let mut file = BufWriter::new(File::create(path)?);
        for item in self {
            item.write_to_file(&mut file)?;
        }
        file.flush()
    }
}

pub(crate) fn get_save_file_name(save_path: &Path, channel: Channel, suffix: &str) -> PathBuf {
    save_path.join(format!("channel_{channel}_{suffix}.csv"))
}
