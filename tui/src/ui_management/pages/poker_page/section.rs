/// A section of the page that takes over the keyboard while active
pub trait SectionActivation {
    fn activate(&mut self);
    fn deactivate(&mut self);
}
